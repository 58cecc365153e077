//! Generational evolution engine
//!
//! Each generation: shuffle and pair the population, play every pair,
//! total payoff per strategy kind, then reallocate a fresh population of
//! `target_size` agents in proportion to each kind's share of
//! `count + payoff`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::config::SimulationConfig;
use crate::error::ConfigurationError;
use crate::game::{score_game, GameResult};
use crate::pairing::shuffle_pairs;
use crate::population::{InitialPopulation, Population, PopulationCounts};
use crate::random::SeededRng;
use crate::strategy::StrategyKind;

/// RNG sub-stream used for spawning the next generation
const SPAWN_STREAM: u32 = u32::MAX;

/// Engine state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Initializing,
    PlayingGeneration(u32),
    Reallocating(u32),
    Terminal,
}

/// Agents and payoff of one kind within a generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTally {
    pub agents: u32,
    pub payoff: u64,
}

/// Aggregate outcome of one generation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub generation: u32,
    pub tallies: BTreeMap<StrategyKind, KindTally>,
    pub games_played: u32,
    /// Kind of the agent that sat out, if the population was odd
    pub bye: Option<StrategyKind>,
}

impl GenerationResult {
    pub fn tally(&self, kind: StrategyKind) -> KindTally {
        self.tallies.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_payoff(&self) -> u64 {
        self.tallies.values().map(|t| t.payoff).sum()
    }

    pub fn total_agents(&self) -> u64 {
        self.tallies.values().map(|t| t.agents as u64).sum()
    }

    fn add(&mut self, agent: &Agent) {
        let tally = self.tallies.entry(agent.kind()).or_default();
        tally.agents += 1;
        tally.payoff += agent.payoff();
    }
}

/// Next generation's counts from a generation's tallies
///
/// `next(kind) = round((agents + payoff) / (total_payoff + total_agents) * target_size)`,
/// rounded half away from zero in exact integer arithmetic. The result is
/// not forced to sum to `target_size`.
pub fn reallocate(result: &GenerationResult, target_size: u32) -> PopulationCounts {
    let denominator = (result.total_payoff() + result.total_agents()) as u128;
    let mut next = PopulationCounts::new();
    if denominator == 0 {
        return next;
    }

    for kind in StrategyKind::ALL {
        let tally = result.tally(kind);
        let fitness = tally.agents as u128 + tally.payoff as u128;
        let scaled = fitness * target_size as u128;
        let rounded = (2 * scaled + denominator) / (2 * denominator);
        // fitness <= denominator, so rounded <= target_size
        next.set(kind, u32::try_from(rounded).unwrap_or(target_size));
    }

    next
}

/// Hooks called while a simulation runs
pub trait GenerationObserver {
    /// Called after each game
    ///
    /// `result` carries totals only; use [`crate::replay_game`] for the
    /// round-by-round record.
    fn on_game(
        &mut self,
        _generation: u32,
        _kinds: (StrategyKind, StrategyKind),
        _result: &GameResult,
    ) {
    }

    /// Called after a generation has been reallocated
    fn on_generation(&mut self, _result: &GenerationResult, _next: &PopulationCounts) {}
}

/// Observer that ignores everything
pub struct NoOpObserver;

impl GenerationObserver for NoOpObserver {}

/// Final snapshot of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub counts: PopulationCounts,
    /// Cooperate percentages of the surviving RandomUniform agents, sorted
    pub random_uniform_pcts: Vec<u8>,
    pub generations: u32,
}

impl fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.counts)
    }
}

/// Runs generations over one population
pub struct EvolutionEngine {
    config: SimulationConfig,
    state: EngineState,
    generations_played: u32,
    population: Population,
    /// Played but not yet reallocated generation, with its spawn stream
    pending: Option<(GenerationResult, SeededRng)>,
}

impl EvolutionEngine {
    /// Validate everything up front and build the first generation
    pub fn new(
        initial: &InitialPopulation,
        config: SimulationConfig,
    ) -> Result<Self, ConfigurationError> {
        let mut engine = Self {
            config,
            state: EngineState::Initializing,
            generations_played: 0,
            population: Population::default(),
            pending: None,
        };

        engine.config.validate()?;
        engine.population = initial.build()?;
        engine.state = if engine.config.generations == 0 {
            EngineState::Terminal
        } else {
            EngineState::PlayingGeneration(0)
        };

        debug!(
            agents = engine.population.len(),
            generations = engine.config.generations,
            rounds = engine.config.rounds_per_generation,
            target_size = engine.config.target_size,
            "Evolution engine initialized"
        );

        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn generations_played(&self) -> u32 {
        self.generations_played
    }

    /// Play one generation and replace the population
    ///
    /// Finishes a generation left in [`EngineState::Reallocating`] by
    /// [`Self::play`]. Returns `None` once the engine is terminal.
    pub fn step(&mut self, observer: &mut dyn GenerationObserver) -> Option<GenerationResult> {
        if let EngineState::PlayingGeneration(_) = self.state {
            self.play(observer);
        }
        self.advance(observer)
    }

    /// Play every game of the current generation without reallocating
    ///
    /// Moves `PlayingGeneration(g)` to `Reallocating(g)`; the population is
    /// untouched until [`Self::advance`]. Returns `None` in any other state.
    pub fn play(&mut self, observer: &mut dyn GenerationObserver) -> Option<&GenerationResult> {
        let generation = match self.state {
            EngineState::PlayingGeneration(g) => g,
            _ => return None,
        };

        let mut rng = SeededRng::new(&self.config.seed, generation);
        let result = self.play_generation(generation, &mut rng, observer);
        let spawn_rng = rng.derive(SPAWN_STREAM);

        self.state = EngineState::Reallocating(generation);
        self.pending = Some((result, spawn_rng));
        self.pending.as_ref().map(|(result, _)| result)
    }

    /// Reallocate a played generation and spawn the next population
    ///
    /// Returns `None` unless the engine is in `Reallocating(g)`.
    pub fn advance(&mut self, observer: &mut dyn GenerationObserver) -> Option<GenerationResult> {
        let generation = match self.state {
            EngineState::Reallocating(g) => g,
            _ => return None,
        };
        let (result, mut spawn_rng) = self.pending.take()?;

        let next = reallocate(&result, self.config.target_size);
        self.population = Population::spawn(&next, &mut spawn_rng);
        observer.on_generation(&result, &next);

        debug!(
            generation,
            games = result.games_played,
            total_payoff = result.total_payoff(),
            next = %next,
            "Generation complete"
        );

        self.generations_played += 1;
        self.state = if self.generations_played >= self.config.generations {
            EngineState::Terminal
        } else {
            EngineState::PlayingGeneration(generation + 1)
        };

        Some(result)
    }

    /// Run all remaining generations
    pub fn run(mut self, observer: &mut dyn GenerationObserver) -> PopulationSummary {
        while self.step(observer).is_some() {}

        let summary = self.summary();
        info!(
            generations = summary.generations,
            final_counts = %summary.counts,
            "Simulation finished"
        );
        summary
    }

    /// Snapshot of the current population
    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary {
            counts: self.population.counts(),
            random_uniform_pcts: self.population.random_uniform_pcts(),
            generations: self.generations_played,
        }
    }

    fn play_generation(
        &mut self,
        generation: u32,
        rng: &mut SeededRng,
        observer: &mut dyn GenerationObserver,
    ) -> GenerationResult {
        let rounds = self.config.rounds_per_generation;
        let pairing = shuffle_pairs(self.population.len(), rng);
        let agents = self.population.agents_mut();

        let mut result = GenerationResult {
            generation,
            ..GenerationResult::default()
        };

        if let Some(index) = pairing.bye {
            let kind = agents[index].kind();
            warn!(generation, kind = %kind, "Odd population, one agent sits this generation out");
            result.bye = Some(kind);
        }

        for (pair_index, (a, b)) in pairing.pairs.iter().enumerate() {
            let (agent_a, agent_b) = pair_mut(agents, *a, *b);
            let game_rng = rng.derive(pair_index as u32);
            let game = score_game(agent_a, agent_b, rounds, &game_rng);

            trace!(
                generation,
                kind_a = %agent_a.kind(),
                kind_b = %agent_b.kind(),
                score_a = game.total_score_a,
                score_b = game.total_score_b,
                "Game played"
            );
            observer.on_game(generation, (agent_a.kind(), agent_b.kind()), &game);
            result.games_played += 1;
        }

        // Each agent's payoff covers only its own game, so merging after
        // play counts every game exactly once.
        for agent in agents.iter() {
            result.add(agent);
        }

        result
    }
}

/// Two distinct agents borrowed mutably at once
fn pair_mut(agents: &mut [Agent], a: usize, b: usize) -> (&mut Agent, &mut Agent) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = agents.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = agents.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Run a full simulation
///
/// Fails before any game is played if the population or config is invalid.
pub fn simulate(
    initial: &InitialPopulation,
    config: &SimulationConfig,
) -> Result<PopulationSummary, ConfigurationError> {
    simulate_with_observer(initial, config, &mut NoOpObserver)
}

/// [`simulate`] with hooks for every game and generation
pub fn simulate_with_observer(
    initial: &InitialPopulation,
    config: &SimulationConfig,
    observer: &mut dyn GenerationObserver,
) -> Result<PopulationSummary, ConfigurationError> {
    let engine = EvolutionEngine::new(initial, config.clone())?;
    Ok(engine.run(observer))
}

/// Run with the default target size and a fresh entropy seed
#[cfg(feature = "std")]
pub fn run_simulation(
    initial: &InitialPopulation,
    generations: i64,
    rounds_per_generation: i64,
) -> Result<PopulationSummary, ConfigurationError> {
    let config = SimulationConfig::new(generations, rounds_per_generation)?.with_random_seed();
    simulate(initial, &config)
}
