//! Strategy definitions and execution

use std::fmt;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

/// Strategy tag, used as the aggregation key for a population
///
/// Carries no parameters: every RandomUniform agent falls in the same bucket
/// regardless of its cooperate percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    AlwaysCooperate,
    AlwaysDefect,
    TitForTat,
    RandomUniform,
    MajorityEcho,
    RandomEcho,
}

impl StrategyKind {
    /// Every kind, in reporting order
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::AlwaysCooperate,
        StrategyKind::AlwaysDefect,
        StrategyKind::TitForTat,
        StrategyKind::RandomUniform,
        StrategyKind::MajorityEcho,
        StrategyKind::RandomEcho,
    ];

    /// Short label used in population summaries
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "Coop",
            StrategyKind::AlwaysDefect => "Defect",
            StrategyKind::TitForTat => "T4T",
            StrategyKind::RandomUniform => "Rand",
            StrategyKind::MajorityEcho => "MajRep",
            StrategyKind::RandomEcho => "RandRep",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "Always Cooperate",
            StrategyKind::AlwaysDefect => "Always Defect",
            StrategyKind::TitForTat => "Tit for Tat",
            StrategyKind::RandomUniform => "Random",
            StrategyKind::MajorityEcho => "Majority Reputation",
            StrategyKind::RandomEcho => "Random Reputation",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decision policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Independent coin flip each round, cooperating `cooperate_pct`% of the time.
    RandomUniform { cooperate_pct: u8 },
    /// Copy a uniformly sampled past opponent move. Start with cooperate.
    RandomEcho,
    /// Defect only if the opponent has mostly defected. Start with cooperate.
    MajorityEcho,
}

impl Strategy {
    /// Largest valid `cooperate_pct`
    pub const MAX_COOPERATE_PCT: u8 = 100;

    /// The aggregation tag of this strategy
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::AlwaysCooperate => StrategyKind::AlwaysCooperate,
            Strategy::AlwaysDefect => StrategyKind::AlwaysDefect,
            Strategy::TitForTat => StrategyKind::TitForTat,
            Strategy::RandomUniform { .. } => StrategyKind::RandomUniform,
            Strategy::RandomEcho => StrategyKind::RandomEcho,
            Strategy::MajorityEcho => StrategyKind::MajorityEcho,
        }
    }

    /// Strategy for a parameterless kind
    ///
    /// Returns `None` for [`StrategyKind::RandomUniform`], which needs a
    /// cooperate percentage.
    pub fn from_kind(kind: StrategyKind) -> Option<Self> {
        match kind {
            StrategyKind::AlwaysCooperate => Some(Strategy::AlwaysCooperate),
            StrategyKind::AlwaysDefect => Some(Strategy::AlwaysDefect),
            StrategyKind::TitForTat => Some(Strategy::TitForTat),
            StrategyKind::RandomUniform => None,
            StrategyKind::RandomEcho => Some(Strategy::RandomEcho),
            StrategyKind::MajorityEcho => Some(Strategy::MajorityEcho),
        }
    }

    /// Reject a RandomUniform percentage above [`Self::MAX_COOPERATE_PCT`]
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Strategy::RandomUniform { cooperate_pct }
                if *cooperate_pct > Self::MAX_COOPERATE_PCT =>
            {
                Err(ConfigurationError::CooperateBiasOutOfRange(*cooperate_pct))
            }
            _ => Ok(()),
        }
    }

    /// Choose the next move
    ///
    /// # Arguments
    /// * `_my_history` - Our past moves this game (none of the current kinds read it)
    /// * `opponent_history` - Opponent's past moves this game
    /// * `rng` - Random number generator for this round
    pub fn decide(
        &self,
        _my_history: &[Move],
        opponent_history: &[Move],
        rng: &mut SeededRng,
    ) -> Move {
        match self {
            Strategy::AlwaysCooperate => Move::Cooperate,
            Strategy::AlwaysDefect => Move::Defect,
            Strategy::TitForTat => execute_tit_for_tat(opponent_history),
            Strategy::RandomUniform { cooperate_pct } => execute_random(*cooperate_pct, rng),
            Strategy::RandomEcho => execute_random_echo(opponent_history, rng),
            Strategy::MajorityEcho => execute_majority_echo(opponent_history),
        }
    }

    /// Get a human-readable description of a strategy
    pub fn describe(&self) -> String {
        match self {
            Strategy::AlwaysCooperate => "Never defects. Always cooperates.".to_string(),
            Strategy::AlwaysDefect => "Never cooperates. Always defects.".to_string(),
            Strategy::TitForTat => {
                "Copies opponent's last move. Starts by cooperating.".to_string()
            }
            Strategy::RandomUniform { cooperate_pct } => {
                format!("Randomly cooperates {}% of the time.", cooperate_pct)
            }
            Strategy::RandomEcho => {
                "Replays a random move from the opponent's history. Starts by cooperating."
                    .to_string()
            }
            Strategy::MajorityEcho => {
                "Defects if the opponent has mostly defected. Starts by cooperating.".to_string()
            }
        }
    }
}

/// Tit-for-Tat: Copy opponent's last move, start with cooperate
fn execute_tit_for_tat(opponent_history: &[Move]) -> Move {
    match opponent_history.last() {
        None => Move::Cooperate,
        Some(m) => *m,
    }
}

/// Random: Cooperate with probability `cooperate_pct / 100`
fn execute_random(cooperate_pct: u8, rng: &mut SeededRng) -> Move {
    if rng.next_percent() < cooperate_pct {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Random echo: replay one uniformly chosen opponent move
fn execute_random_echo(opponent_history: &[Move], rng: &mut SeededRng) -> Move {
    opponent_history
        .choose(rng)
        .copied()
        .unwrap_or(Move::Cooperate)
}

/// Majority echo: defect only on a strict defect majority, ties cooperate
fn execute_majority_echo(opponent_history: &[Move]) -> Move {
    let defections = opponent_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();

    if defections * 2 > opponent_history.len() {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, prop_oneof, proptest, Just};

    use super::Move::{Cooperate as C, Defect as D};

    fn make_rng() -> SeededRng {
        SeededRng::new(&[42u8; 32], 0)
    }

    #[test]
    fn test_tit_for_tat_first_move() {
        let mut rng = make_rng();
        assert_eq!(Strategy::TitForTat.decide(&[], &[], &mut rng), C);
    }

    #[test]
    fn test_tit_for_tat_copies() {
        let mut rng = make_rng();

        assert_eq!(Strategy::TitForTat.decide(&[C], &[C], &mut rng), C);
        assert_eq!(Strategy::TitForTat.decide(&[C], &[D], &mut rng), D);
    }

    #[test]
    fn test_tit_for_tat_against_fixed_opponent() {
        // Opponent plays C, D, C across the first three rounds
        let opponent = [C, D, C];
        let mut rng = make_rng();
        let mut mine = Vec::new();

        for round in 0..4 {
            let m = Strategy::TitForTat.decide(&mine, &opponent[..round.min(3)], &mut rng);
            mine.push(m);
        }

        assert_eq!(mine, vec![C, C, D, C]);
    }

    #[test]
    fn test_always_defect() {
        let mut rng = make_rng();
        for _ in 0..10 {
            assert_eq!(Strategy::AlwaysDefect.decide(&[], &[C, C], &mut rng), D);
        }
    }

    #[test]
    fn test_always_cooperate() {
        let mut rng = make_rng();
        for _ in 0..10 {
            assert_eq!(Strategy::AlwaysCooperate.decide(&[], &[D, D], &mut rng), C);
        }
    }

    #[test]
    fn test_majority_echo_tie_cooperates() {
        let mut rng = make_rng();
        assert_eq!(Strategy::MajorityEcho.decide(&[C, C], &[C, D], &mut rng), C);
    }

    #[test]
    fn test_majority_echo_strict_majority_defects() {
        let mut rng = make_rng();
        assert_eq!(Strategy::MajorityEcho.decide(&[C, C, C], &[D, C, D], &mut rng), D);
        assert_eq!(Strategy::MajorityEcho.decide(&[C, C, C], &[D, C, C], &mut rng), C);
    }

    #[test]
    fn test_history_dependent_kinds_open_with_cooperate() {
        let mut rng = make_rng();
        for strategy in [Strategy::TitForTat, Strategy::RandomEcho, Strategy::MajorityEcho] {
            assert_eq!(strategy.decide(&[], &[], &mut rng), C, "{:?}", strategy);
        }
    }

    #[test]
    fn test_random_echo_single_move_history() {
        let mut rng = make_rng();
        for _ in 0..20 {
            assert_eq!(Strategy::RandomEcho.decide(&[C], &[D], &mut rng), D);
        }
    }

    #[test]
    fn test_random_echo_samples_whole_history() {
        let mut rng = make_rng();
        let opponent = [D, C, C, C];
        let mut seen_d = false;
        let mut seen_c = false;

        for _ in 0..200 {
            match Strategy::RandomEcho.decide(&[C; 4], &opponent, &mut rng) {
                D => seen_d = true,
                C => seen_c = true,
            }
        }

        assert!(seen_d && seen_c, "both moves in the history should be replayed");
    }

    #[test]
    fn test_cooperate_pct_zero_means_always_defect() {
        let strategy = Strategy::RandomUniform { cooperate_pct: 0 };
        let mut rng = make_rng();
        for _ in 0..20 {
            assert_eq!(strategy.decide(&[], &[], &mut rng), D);
        }
    }

    #[test]
    fn test_cooperate_pct_100_means_always_cooperate() {
        let strategy = Strategy::RandomUniform { cooperate_pct: 100 };
        let mut rng = make_rng();
        for _ in 0..20 {
            assert_eq!(strategy.decide(&[], &[], &mut rng), C);
        }
    }

    #[test]
    fn test_cooperate_pct_statistical() {
        let strategy = Strategy::RandomUniform { cooperate_pct: 75 };
        let mut rng = make_rng();
        let samples = 4000;

        let cooperations = (0..samples)
            .filter(|_| strategy.decide(&[], &[], &mut rng) == C)
            .count();

        let rate = cooperations as f64 / samples as f64;
        assert!(rate > 0.70 && rate < 0.80, "cooperation rate {} not ~0.75", rate);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in StrategyKind::ALL {
            match Strategy::from_kind(kind) {
                Some(strategy) => assert_eq!(strategy.kind(), kind),
                None => assert_eq!(kind, StrategyKind::RandomUniform),
            }
        }
        assert_eq!(
            Strategy::RandomUniform { cooperate_pct: 30 }.kind(),
            StrategyKind::RandomUniform
        );
    }

    #[test]
    fn test_describe_mentions_percentage() {
        let desc = Strategy::RandomUniform { cooperate_pct: 25 }.describe();
        assert!(desc.contains("25%"));
    }

    #[test]
    fn test_validate_cooperate_pct_bound() {
        assert_eq!(Strategy::RandomUniform { cooperate_pct: 100 }.validate(), Ok(()));
        assert_eq!(Strategy::TitForTat.validate(), Ok(()));
        assert_eq!(
            Strategy::RandomUniform { cooperate_pct: 150 }.validate(),
            Err(ConfigurationError::CooperateBiasOutOfRange(150))
        );
    }

    #[test]
    fn test_out_of_range_strategy_parses_but_fails_validation() {
        let strategy: Strategy =
            serde_json::from_str(r#"{"RandomUniform":{"cooperate_pct":150}}"#).unwrap();
        assert!(strategy.validate().is_err());
    }

    fn arb_move() -> impl proptest::strategy::Strategy<Value = Move> {
        prop_oneof![Just(C), Just(D)]
    }

    proptest! {
        #[test]
        fn prop_majority_echo_matches_counts(
            history in proptest::collection::vec(arb_move(), 1..40),
        ) {
            let mut rng = make_rng();
            let defections = history.iter().filter(|m| **m == D).count();
            let expected = if defections * 2 > history.len() { D } else { C };
            prop_assert_eq!(Strategy::MajorityEcho.decide(&[], &history, &mut rng), expected);
        }

        #[test]
        fn prop_random_echo_replays_a_seen_move(
            history in proptest::collection::vec(arb_move(), 1..40),
            stream in any::<u32>(),
        ) {
            let mut rng = SeededRng::new(&[3u8; 32], stream);
            let m = Strategy::RandomEcho.decide(&[], &history, &mut rng);
            prop_assert!(history.contains(&m));
        }
    }
}
