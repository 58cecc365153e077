//! Configuration errors

use thiserror::Error;

/// Rejected simulation setup
///
/// Every variant is detected before any game is played.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Total population must be even, got {total}")]
    OddPopulation { total: u64 },

    #[error("Generation count must not be negative, got {0}")]
    NegativeGenerations(i64),

    #[error("Rounds per generation must not be negative, got {0}")]
    NegativeRounds(i64),

    #[error("Target population size must be at least 1, got {0}")]
    InvalidTargetSize(i64),

    #[error("Cooperate percentage must be within 0..=100, got {0}")]
    CooperateBiasOutOfRange(u8),

    #[error("RandomUniform agents must be listed by cooperate percentage, not by count")]
    RandomUniformCount,

    #[error("{field} of {value} exceeds the supported range")]
    ValueTooLarge { field: &'static str, value: i64 },

    #[error("Population size overflows the supported range")]
    TooManyAgents,
}
