//! WASM bindings for frontend replay and exploration

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::{replay_game, simulate, InitialPopulation, SimulationConfig, Strategy, StrategyKind};

fn parse_seed(seed: &[u8]) -> Result<[u8; 32], JsError> {
    seed.try_into()
        .map_err(|_| JsError::new("Seed must be exactly 32 bytes"))
}

fn parse_strategy(json: &str) -> Result<Strategy, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("Invalid strategy: {}", e)))
}

/// Run a full evolution
///
/// # Arguments
/// * `initial_json` - JSON serialized InitialPopulation,
///   e.g. `{"counts": {"TitForTat": 10}, "random_uniform": [25, 75]}`
/// * `generations` - Number of generations (negative is rejected)
/// * `rounds_per_generation` - Rounds per game (negative is rejected)
/// * `target_size` - Renormalized population size
/// * `seed` - 32-byte randomness seed
///
/// # Returns
/// JSON serialized PopulationSummary
#[wasm_bindgen]
pub fn simulate_population(
    initial_json: &str,
    generations: i64,
    rounds_per_generation: i64,
    target_size: i64,
    seed: &[u8],
) -> Result<JsValue, JsError> {
    let initial: InitialPopulation = serde_json::from_str(initial_json)
        .map_err(|e| JsError::new(&format!("Invalid initial population: {}", e)))?;

    let config = SimulationConfig::new(generations, rounds_per_generation)?
        .with_target_size(target_size)?
        .with_seed(parse_seed(seed)?);

    let summary = simulate(&initial, &config)?;

    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Replay one game with full round-by-round details
///
/// # Arguments
/// * `strategy_a_json` - JSON serialized Strategy for player A, e.g. `"TitForTat"`
///   or `{"RandomUniform": {"cooperate_pct": 40}}`
/// * `strategy_b_json` - JSON serialized Strategy for player B
/// * `rounds` - Number of rounds
/// * `seed` - 32-byte randomness seed
///
/// # Returns
/// JSON serialized GameResult; fails for a cooperate percentage above 100
#[wasm_bindgen]
pub fn replay_strategy_game(
    strategy_a_json: &str,
    strategy_b_json: &str,
    rounds: u32,
    seed: &[u8],
) -> Result<JsValue, JsError> {
    let strategy_a = parse_strategy(strategy_a_json)?;
    let strategy_b = parse_strategy(strategy_b_json)?;

    let result = replay_game(strategy_a, strategy_b, rounds, &parse_seed(seed)?)?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

#[derive(serde::Serialize)]
struct StrategyInfo {
    id: StrategyKind,
    name: &'static str,
    label: &'static str,
    description: String,
}

/// Get all available strategy kinds
#[wasm_bindgen]
pub fn get_strategy_types() -> Result<JsValue, JsError> {
    let types: Vec<StrategyInfo> = StrategyKind::ALL
        .into_iter()
        .map(|kind| {
            let description = Strategy::from_kind(kind)
                .unwrap_or(Strategy::RandomUniform { cooperate_pct: 50 })
                .describe();
            StrategyInfo {
                id: kind,
                name: kind.name(),
                label: kind.label(),
                description,
            }
        })
        .collect();

    serde_wasm_bindgen::to_value(&types)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
