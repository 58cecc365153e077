//! The reference experiment

use evolution_logic::{
    simulate, ConfigurationError, InitialPopulation, PopulationSummary, SimulationConfig,
    StrategyKind, DEFAULT_GENERATIONS, DEFAULT_ROUNDS_PER_GENERATION, DEFAULT_TARGET_SIZE,
};
use tracing::debug;

/// Independent repetitions of the reference experiment
pub const REFERENCE_TRIALS: u32 = 10;

/// Cooperate percentages of the starting RandomUniform agents
pub const REFERENCE_RANDOM_PCTS: [u8; 10] = [25, 25, 25, 50, 50, 50, 50, 75, 75, 75];

/// A batch of independent runs from the same starting point
pub struct Experiment {
    pub trials: u32,
    pub initial: InitialPopulation,
    pub generations: i64,
    pub rounds_per_generation: i64,
    pub target_size: i64,
}

impl Experiment {
    /// Ten agents of each parameterless kind plus ten RandomUniform agents,
    /// 20 generations of 20-round games, rescaled to 60 agents
    pub fn reference() -> Self {
        let initial = InitialPopulation::new()
            .with(StrategyKind::AlwaysCooperate, 10)
            .with(StrategyKind::AlwaysDefect, 10)
            .with(StrategyKind::TitForTat, 10)
            .with(StrategyKind::MajorityEcho, 10)
            .with(StrategyKind::RandomEcho, 10)
            .with_random_uniform(REFERENCE_RANDOM_PCTS);

        Self {
            trials: REFERENCE_TRIALS,
            initial,
            generations: DEFAULT_GENERATIONS as i64,
            rounds_per_generation: DEFAULT_ROUNDS_PER_GENERATION as i64,
            target_size: DEFAULT_TARGET_SIZE as i64,
        }
    }

    /// Run every trial with its own entropy seed
    pub fn run(&self) -> Result<Vec<PopulationSummary>, ConfigurationError> {
        let base = SimulationConfig::new(self.generations, self.rounds_per_generation)?
            .with_target_size(self.target_size)?;

        (0..self.trials)
            .map(|trial| {
                let config = base.clone().with_random_seed();
                debug!(trial, seed = %hex(&config.seed), "Starting trial");
                simulate(&self.initial, &config)
            })
            .collect()
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
