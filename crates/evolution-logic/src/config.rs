//! Simulation parameters

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Population size every generation after the first is rescaled to
pub const DEFAULT_TARGET_SIZE: u32 = 60;

/// Generations in the reference experiment
pub const DEFAULT_GENERATIONS: u32 = 20;

/// Rounds per game in the reference experiment
pub const DEFAULT_ROUNDS_PER_GENERATION: u32 = 20;

/// Parameters for one evolution run
///
/// Built through [`SimulationConfig::new`] so signed inputs from callers are
/// range-checked once, up front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of generations to play
    pub generations: u32,
    /// Rounds in every game
    pub rounds_per_generation: u32,
    /// Renormalized population size for each new generation
    pub target_size: u32,
    /// Randomness seed; the same seed replays the same run
    pub seed: [u8; 32],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generations: DEFAULT_GENERATIONS,
            rounds_per_generation: DEFAULT_ROUNDS_PER_GENERATION,
            target_size: DEFAULT_TARGET_SIZE,
            seed: [0u8; 32],
        }
    }
}

impl SimulationConfig {
    /// Validated config with the default target size and a zero seed
    pub fn new(generations: i64, rounds_per_generation: i64) -> Result<Self, ConfigurationError> {
        if generations < 0 {
            return Err(ConfigurationError::NegativeGenerations(generations));
        }
        if rounds_per_generation < 0 {
            return Err(ConfigurationError::NegativeRounds(rounds_per_generation));
        }

        Ok(Self {
            generations: to_u32("generations", generations)?,
            rounds_per_generation: to_u32("rounds_per_generation", rounds_per_generation)?,
            ..Self::default()
        })
    }

    /// Override the renormalized population size
    pub fn with_target_size(mut self, target_size: i64) -> Result<Self, ConfigurationError> {
        if target_size < 1 {
            return Err(ConfigurationError::InvalidTargetSize(target_size));
        }
        self.target_size = to_u32("target_size", target_size)?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: [u8; 32]) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the seed with fresh entropy
    #[cfg(feature = "std")]
    pub fn with_random_seed(self) -> Self {
        self.with_seed(rand::random())
    }

    /// Re-check a config that was built or deserialized field by field
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.target_size == 0 {
            return Err(ConfigurationError::InvalidTargetSize(0));
        }
        Ok(())
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, ConfigurationError> {
    u32::try_from(value).map_err(|_| ConfigurationError::ValueTooLarge { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_experiment() {
        let config = SimulationConfig::default();
        assert_eq!(config.generations, 20);
        assert_eq!(config.rounds_per_generation, 20);
        assert_eq!(config.target_size, 60);
    }

    #[test]
    fn test_new_accepts_zero() {
        let config = SimulationConfig::new(0, 0).unwrap();
        assert_eq!(config.generations, 0);
        assert_eq!(config.rounds_per_generation, 0);
        assert_eq!(config.target_size, DEFAULT_TARGET_SIZE);
    }

    #[test]
    fn test_negative_generations_rejected() {
        assert_eq!(
            SimulationConfig::new(-1, 5),
            Err(ConfigurationError::NegativeGenerations(-1))
        );
    }

    #[test]
    fn test_negative_rounds_rejected() {
        assert_eq!(
            SimulationConfig::new(3, -7),
            Err(ConfigurationError::NegativeRounds(-7))
        );
    }

    #[test]
    fn test_oversized_values_rejected() {
        let too_big = u32::MAX as i64 + 1;
        assert_eq!(
            SimulationConfig::new(too_big, 1),
            Err(ConfigurationError::ValueTooLarge { field: "generations", value: too_big })
        );
    }

    #[test]
    fn test_target_size_must_be_positive() {
        let base = SimulationConfig::new(1, 1).unwrap();
        assert_eq!(
            base.clone().with_target_size(0),
            Err(ConfigurationError::InvalidTargetSize(0))
        );
        assert_eq!(base.with_target_size(20).unwrap().target_size, 20);
    }

    #[test]
    fn test_validate_catches_deserialized_zero_target() {
        let json = format!(
            r#"{{"generations":1,"rounds_per_generation":1,"target_size":0,"seed":{:?}}}"#,
            [0u8; 32]
        );
        let config: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidTargetSize(0)));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_random_seed_changes_seed() {
        let a = SimulationConfig::default().with_random_seed();
        let b = SimulationConfig::default().with_random_seed();
        assert_ne!(a.seed, b.seed);
    }
}
