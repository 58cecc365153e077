//! Populations, per-kind counts, and initial population specs

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::ConfigurationError;
use crate::random::SeededRng;
use crate::strategy::{Strategy, StrategyKind};

/// Agent count per strategy kind
///
/// Kinds that were never set read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    counts: BTreeMap<StrategyKind, u32>,
}

impl PopulationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: StrategyKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Setting zero removes the kind, so equal counts compare equal
    pub fn set(&mut self, kind: StrategyKind, count: u32) {
        if count == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, count);
        }
    }

    /// Sum over all kinds
    pub fn total(&self) -> u64 {
        self.counts.values().map(|c| *c as u64).sum()
    }

    /// Every kind with its count, in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, u32)> + '_ {
        StrategyKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl fmt::Display for PopulationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, count) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}: {}", kind.label(), count)?;
            first = false;
        }
        Ok(())
    }
}

/// Starting population for a run
///
/// Parameterless kinds are given by count. RandomUniform agents are listed
/// one per cooperate percentage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPopulation {
    #[serde(default)]
    pub counts: BTreeMap<StrategyKind, u32>,
    #[serde(default)]
    pub random_uniform: Vec<u8>,
}

impl InitialPopulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` agents of a parameterless kind
    pub fn with(mut self, kind: StrategyKind, count: u32) -> Self {
        *self.counts.entry(kind).or_insert(0) += count;
        self
    }

    /// Add one RandomUniform agent per listed cooperate percentage
    pub fn with_random_uniform(mut self, cooperate_pcts: impl IntoIterator<Item = u8>) -> Self {
        self.random_uniform.extend(cooperate_pcts);
        self
    }

    /// Sum of all agents
    pub fn total(&self) -> u64 {
        self.counts.values().map(|c| *c as u64).sum::<u64>() + self.random_uniform.len() as u64
    }

    /// Validate and build the first generation
    pub fn build(&self) -> Result<Population, ConfigurationError> {
        if self.counts.get(&StrategyKind::RandomUniform).is_some_and(|c| *c > 0) {
            return Err(ConfigurationError::RandomUniformCount);
        }
        for pct in &self.random_uniform {
            Strategy::RandomUniform { cooperate_pct: *pct }.validate()?;
        }

        let total = self.total();
        if total % 2 != 0 {
            return Err(ConfigurationError::OddPopulation { total });
        }
        let capacity = usize::try_from(total).map_err(|_| ConfigurationError::TooManyAgents)?;

        let mut agents = Vec::with_capacity(capacity);
        for kind in StrategyKind::ALL {
            if let Some(strategy) = Strategy::from_kind(kind) {
                let count = self.counts.get(&kind).copied().unwrap_or(0);
                agents.extend((0..count).map(|_| Agent::new(strategy)));
            }
        }
        agents.extend(
            self.random_uniform
                .iter()
                .map(|pct| Agent::new(Strategy::RandomUniform { cooperate_pct: *pct })),
        );

        Ok(Population { agents })
    }
}

/// The live agents of one generation
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Fresh agents for the given counts
    ///
    /// Every RandomUniform agent draws its cooperate percentage uniformly
    /// from `0..=100`; nothing is inherited from the previous generation.
    pub fn spawn(counts: &PopulationCounts, rng: &mut SeededRng) -> Self {
        let capacity = usize::try_from(counts.total()).unwrap_or(0);
        let mut agents = Vec::with_capacity(capacity);

        for (kind, count) in counts.iter() {
            for _ in 0..count {
                let strategy = match Strategy::from_kind(kind) {
                    Some(strategy) => strategy,
                    None => Strategy::RandomUniform {
                        cooperate_pct: rng.random_range(0..=Strategy::MAX_COOPERATE_PCT),
                    },
                };
                agents.push(Agent::new(strategy));
            }
        }

        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Agent count per kind
    pub fn counts(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::new();
        for agent in &self.agents {
            let kind = agent.kind();
            counts.set(kind, counts.get(kind) + 1);
        }
        counts
    }

    /// Cooperate percentages of the RandomUniform agents, sorted
    pub fn random_uniform_pcts(&self) -> Vec<u8> {
        let mut pcts: Vec<u8> = self
            .agents
            .iter()
            .filter_map(|agent| match agent.strategy() {
                Strategy::RandomUniform { cooperate_pct } => Some(*cooperate_pct),
                _ => None,
            })
            .collect();
        pcts.sort_unstable();
        pcts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_population() -> InitialPopulation {
        InitialPopulation::new()
            .with(StrategyKind::AlwaysCooperate, 10)
            .with(StrategyKind::AlwaysDefect, 10)
            .with(StrategyKind::TitForTat, 10)
            .with(StrategyKind::MajorityEcho, 10)
            .with(StrategyKind::RandomEcho, 10)
            .with_random_uniform([25, 25, 25, 50, 50, 50, 50, 75, 75, 75])
    }

    #[test]
    fn test_build_reference_population() {
        let population = reference_population().build().unwrap();
        assert_eq!(population.len(), 60);

        let counts = population.counts();
        for kind in StrategyKind::ALL {
            assert_eq!(counts.get(kind), 10, "{:?}", kind);
        }
        assert_eq!(
            population.random_uniform_pcts(),
            vec![25, 25, 25, 50, 50, 50, 50, 75, 75, 75]
        );
    }

    #[test]
    fn test_odd_population_rejected() {
        let spec = InitialPopulation::new()
            .with(StrategyKind::AlwaysCooperate, 6)
            .with(StrategyKind::TitForTat, 4)
            .with_random_uniform([50]);
        assert_eq!(spec.build().unwrap_err(), ConfigurationError::OddPopulation { total: 11 });
    }

    #[test]
    fn test_random_uniform_count_rejected() {
        let spec = InitialPopulation::new().with(StrategyKind::RandomUniform, 2);
        assert_eq!(spec.build().unwrap_err(), ConfigurationError::RandomUniformCount);
    }

    #[test]
    fn test_cooperate_pct_out_of_range_rejected() {
        let spec = InitialPopulation::new().with_random_uniform([50, 101]);
        assert_eq!(
            spec.build().unwrap_err(),
            ConfigurationError::CooperateBiasOutOfRange(101)
        );
    }

    #[test]
    fn test_empty_population_is_valid() {
        let population = InitialPopulation::new().build().unwrap();
        assert!(population.is_empty());
        assert_eq!(population.counts().total(), 0);
    }

    #[test]
    fn test_spawn_matches_counts() {
        let mut counts = PopulationCounts::new();
        counts.set(StrategyKind::TitForTat, 3);
        counts.set(StrategyKind::RandomUniform, 40);
        counts.set(StrategyKind::RandomEcho, 1);

        let mut rng = SeededRng::new(&[42u8; 32], 0);
        let population = Population::spawn(&counts, &mut rng);

        assert_eq!(population.len(), 44);
        assert_eq!(population.counts(), counts);

        let pcts = population.random_uniform_pcts();
        assert_eq!(pcts.len(), 40);
        assert!(pcts.iter().all(|p| *p <= 100));
        assert!(pcts.first() != pcts.last(), "40 draws should not all be equal");
    }

    #[test]
    fn test_counts_display_in_reporting_order() {
        let mut counts = PopulationCounts::new();
        counts.set(StrategyKind::AlwaysDefect, 7);
        counts.set(StrategyKind::RandomEcho, 3);
        assert_eq!(
            counts.to_string(),
            "Coop: 0 Defect: 7 T4T: 0 Rand: 0 MajRep: 0 RandRep: 3"
        );
    }

    #[test]
    fn test_initial_population_from_json() {
        let json = r#"{"counts":{"AlwaysCooperate":2,"TitForTat":1},"random_uniform":[30]}"#;
        let spec: InitialPopulation = serde_json::from_str(json).unwrap();
        assert_eq!(spec.total(), 4);
        assert_eq!(spec.build().unwrap().counts().get(StrategyKind::RandomUniform), 1);
    }
}
