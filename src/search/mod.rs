//! Search module for Gomoku AI
//!
//! Contains:
//! - Arena search tree shared by the MCTS engine (node + tree)
//! - Time-bounded MCTS guided by a scoring policy
//! - Depth-bounded negamax with alpha-beta pruning over a reusable tree

pub mod mcts;
pub mod minimax;
pub mod node;
pub mod tree;

use std::time::Duration;

use thiserror::Error;

use crate::board::BoardError;
use crate::policy::PolicyError;

pub use mcts::{MctsConfig, MctsEngine};
pub use minimax::{Bound, MinimaxConfig, MinimaxEngine};
pub use node::{MctsNode, NodeId};
pub use tree::MctsTree;

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Invalid policy output: {0}")]
    InvalidPolicy(String),

    #[error("The game is already over")]
    GameOver,

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// Search statistics for the last `get_action` call
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// MCTS iterations, or minimax nodes visited
    pub iterations: u32,
    pub duration: Duration,
    /// Nodes held by the tree after the search
    pub nodes: usize,
}
