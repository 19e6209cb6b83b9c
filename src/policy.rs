//! Scoring policies for tree search.
//!
//! A policy looks at a position and returns a value estimate for the player
//! to move together with a prior for every legal move. The MCTS engine owns
//! its policy as a `Box<dyn ScoringPolicy>`.

use std::cell::RefCell;

use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::eval::{PatternEvaluator, PatternScore};

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Board error: {0}")]
    Board(#[from] BoardError),
}

/// Result of evaluating a position.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutput {
    /// Value estimate for the player to move, in [-1, 1].
    pub value: f32,

    /// One entry per legal move. Need not be normalized.
    pub priors: Vec<(crate::board::Pos, f32)>,
}

/// Trait for position scoring.
///
/// Implementations may cache internally, so `evaluate` takes `&self` but is
/// not required to be free of side effects.
pub trait ScoringPolicy {
    fn evaluate(&self, board: &Board) -> Result<PolicyOutput, PolicyError>;
}

impl<F> ScoringPolicy for F
where
    F: Fn(&Board) -> Result<PolicyOutput, PolicyError>,
{
    fn evaluate(&self, board: &Board) -> Result<PolicyOutput, PolicyError> {
        self(board)
    }
}

/// Equal priors on every legal move, neutral value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPolicy;

impl ScoringPolicy for UniformPolicy {
    fn evaluate(&self, board: &Board) -> Result<PolicyOutput, PolicyError> {
        let moves = board.legal_moves();
        let p = if moves.is_empty() {
            0.0
        } else {
            1.0 / moves.len() as f32
        };
        Ok(PolicyOutput {
            value: 0.0,
            priors: moves.into_iter().map(|m| (m, p)).collect(),
        })
    }
}

/// Policy backed by the incremental pattern evaluator.
///
/// The evaluator is kept between calls and synced to each board, so
/// consecutive positions from one search only replay the moves that differ.
#[derive(Debug)]
pub struct PatternPolicy {
    evaluator: RefCell<Option<PatternEvaluator>>,
    /// Weight of the uniform component mixed into the priors
    exploration_mix: f32,
}

impl Default for PatternPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternPolicy {
    pub fn new() -> Self {
        Self {
            evaluator: RefCell::new(None),
            exploration_mix: 0.1,
        }
    }

    /// Builder pattern: set the uniform mixing weight (clamped to [0, 1]).
    pub fn with_exploration_mix(mut self, mix: f32) -> Self {
        self.exploration_mix = mix.clamp(0.0, 1.0);
        self
    }
}

impl ScoringPolicy for PatternPolicy {
    fn evaluate(&self, board: &Board) -> Result<PolicyOutput, PolicyError> {
        let mut cache = self
            .evaluator
            .try_borrow_mut()
            .map_err(|e| PolicyError::EvaluationFailed(e.to_string()))?;
        let evaluator = cache.get_or_insert_with(|| PatternEvaluator::new(*board.config()));
        evaluator.sync_with_board(board)?;

        let moves = board.legal_moves();
        if moves.is_empty() {
            return Ok(PolicyOutput {
                value: 0.0,
                priors: Vec::new(),
            });
        }

        let mover = board.current_player();
        let config = *board.config();
        let mut probs = evaluator.evaluation_probs(mover);
        let uniform = self.exploration_mix / moves.len() as f32;
        for &m in &moves {
            let idx = config.index(m);
            probs[idx] = (1.0 - self.exploration_mix) * probs[idx] + uniform;
        }
        let probs = evaluator.decisive_filter(&probs);

        let value = if !evaluator.winning_cells(mover).is_empty() {
            1.0
        } else if evaluator.winning_cells(mover.opponent()).len() >= 2 {
            -1.0
        } else {
            let scale = 2.0 * PatternScore::OPEN_THREE as f64;
            (evaluator.evaluation_value(mover) as f64 / scale).tanh() as f32
        };

        Ok(PolicyOutput {
            value,
            priors: moves
                .into_iter()
                .map(|m| (m, probs[config.index(m)]))
                .collect(),
        })
    }
}
