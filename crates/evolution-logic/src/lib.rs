//! Evolution logic for Evolution Arena
//!
//! Core engine for the evolutionary Iterated Prisoner's Dilemma: a
//! population of fixed strategies is paired off each generation, plays
//! multi-round games, and is reallocated by payoff share.
//! This crate is compiled to:
//! - Native (for the experiment driver)
//! - WASM (for frontend replay and exploration)

mod agent;
mod config;
mod error;
mod evolution;
mod game;
mod pairing;
mod population;
mod random;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use agent::Agent;
pub use config::{
    SimulationConfig, DEFAULT_GENERATIONS, DEFAULT_ROUNDS_PER_GENERATION, DEFAULT_TARGET_SIZE,
};
pub use error::ConfigurationError;
#[cfg(feature = "std")]
pub use evolution::run_simulation;
pub use evolution::{
    reallocate, simulate, simulate_with_observer, EngineState, EvolutionEngine,
    GenerationObserver, GenerationResult, KindTally, NoOpObserver, PopulationSummary,
};
pub use game::{replay_game, run_game, score_game, GameResult, RoundResult};
pub use pairing::{pair_indices, shuffle_pairs, Pairing};
pub use population::{InitialPopulation, Population, PopulationCounts};
pub use random::SeededRng;
pub use strategy::{Move, Strategy, StrategyKind};

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (score_a, score_b)
pub fn payoff(a: Move, b: Move) -> (u8, u8) {
    match (a, b) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Defect) => (0, 5),
        (Move::Defect, Move::Cooperate) => (5, 0),
        (Move::Defect, Move::Defect) => (1, 1),
    }
}
