//! Game execution engine

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::ConfigurationError;
use crate::payoff;
use crate::random::SeededRng;
use crate::strategy::{Move, Strategy};

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: u8,
    pub score_b: u8,
    pub cumulative_a: u64,
    pub cumulative_b: u64,
}

/// Result of a complete game
///
/// `rounds` is empty when the game was played through [`score_game`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub rounds: Vec<RoundResult>,
    pub total_score_a: u64,
    pub total_score_b: u64,
    pub round_count: u32,
}

impl GameResult {
    /// `(total_a, total_b)`
    pub fn totals(&self) -> (u64, u64) {
        (self.total_score_a, self.total_score_b)
    }
}

/// Play a complete game between two agents
///
/// Both agents are reset first, so their histories and payoff describe only
/// this game afterwards. Each round both agents decide from their own
/// histories, before either history sees the current round.
///
/// # Arguments
/// * `agent_a` - First player
/// * `agent_b` - Second player
/// * `rounds` - Number of rounds; `0` is a valid no-op game
/// * `rng` - Randomness for this game; each round and player gets its own sub-stream
pub fn run_game(
    agent_a: &mut Agent,
    agent_b: &mut Agent,
    rounds: u32,
    rng: &SeededRng,
) -> GameResult {
    play(agent_a, agent_b, rounds, rng, true)
}

/// Play a complete game keeping only the totals
///
/// Same moves and scores as [`run_game`] for the same inputs, without the
/// per-round record.
pub fn score_game(
    agent_a: &mut Agent,
    agent_b: &mut Agent,
    rounds: u32,
    rng: &SeededRng,
) -> GameResult {
    play(agent_a, agent_b, rounds, rng, false)
}

fn play(
    agent_a: &mut Agent,
    agent_b: &mut Agent,
    rounds: u32,
    rng: &SeededRng,
    record_rounds: bool,
) -> GameResult {
    agent_a.reset(rounds);
    agent_b.reset(rounds);

    let mut results = if record_rounds {
        Vec::with_capacity(rounds as usize)
    } else {
        Vec::new()
    };
    let mut total_a = 0u64;
    let mut total_b = 0u64;

    for round in 0..rounds {
        // Per-round RNG for each player so they don't affect each other
        let mut rng_a = rng.derive(round.wrapping_mul(2));
        let mut rng_b = rng.derive(round.wrapping_mul(2).wrapping_add(1));

        // Decide simultaneously
        let move_a = agent_a
            .strategy()
            .decide(agent_a.moves(), agent_a.opponent_moves(), &mut rng_a);
        let move_b = agent_b
            .strategy()
            .decide(agent_b.moves(), agent_b.opponent_moves(), &mut rng_b);

        let (score_a, score_b) = payoff(move_a, move_b);
        total_a += u64::from(score_a);
        total_b += u64::from(score_b);

        agent_a.record(move_a, move_b, score_a);
        agent_b.record(move_b, move_a, score_b);

        if record_rounds {
            results.push(RoundResult {
                round,
                move_a,
                move_b,
                score_a,
                score_b,
                cumulative_a: total_a,
                cumulative_b: total_b,
            });
        }
    }

    GameResult {
        rounds: results,
        total_score_a: total_a,
        total_score_b: total_b,
        round_count: rounds,
    }
}

/// Replay a game between two fresh agents, round by round
///
/// Fails if either strategy carries an out-of-range cooperate percentage.
pub fn replay_game(
    strategy_a: Strategy,
    strategy_b: Strategy,
    rounds: u32,
    seed: &[u8; 32],
) -> Result<GameResult, ConfigurationError> {
    strategy_a.validate()?;
    strategy_b.validate()?;

    let mut agent_a = Agent::new(strategy_a);
    let mut agent_b = Agent::new(strategy_b);
    Ok(run_game(&mut agent_a, &mut agent_b, rounds, &SeededRng::new(seed, 0)))
}
