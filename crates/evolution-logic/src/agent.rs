//! A single live player for one generation

use crate::strategy::{Move, Strategy, StrategyKind};

/// One strategy instance with its own game state
///
/// Created at generation start, plays at most one game, then is dropped.
/// Histories are owned by the agent; nothing is shared between agents.
#[derive(Clone, Debug)]
pub struct Agent {
    strategy: Strategy,
    moves: Vec<Move>,
    opponent_moves: Vec<Move>,
    payoff: u64,
}

impl Agent {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            moves: Vec::new(),
            opponent_moves: Vec::new(),
            payoff: 0,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Own moves in the current game
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Opponent moves observed in the current game
    pub fn opponent_moves(&self) -> &[Move] {
        &self.opponent_moves
    }

    /// Payoff accumulated in the current game
    pub fn payoff(&self) -> u64 {
        self.payoff
    }

    /// Clear game state before a new game
    pub(crate) fn reset(&mut self, rounds: u32) {
        self.moves.clear();
        self.opponent_moves.clear();
        self.moves.reserve(rounds as usize);
        self.opponent_moves.reserve(rounds as usize);
        self.payoff = 0;
    }

    /// Record one finished round
    pub(crate) fn record(&mut self, own: Move, opponent: Move, score: u8) {
        self.moves.push(own);
        self.opponent_moves.push(opponent);
        self.payoff += u64::from(score);
    }
}
