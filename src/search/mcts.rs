//! Time-bounded MCTS with tree reuse across turns.
//!
//! One iteration:
//! 1. Selection: descend by UCB while nodes are expanded
//! 2. Expansion: one policy call, one child per legal move
//! 3. Backpropagation: the policy value (or terminal result), negated per ply
//!
//! The clock is only read between iterations, and at least one iteration
//! always runs.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use super::node::NodeId;
use super::tree::MctsTree;
use super::{EngineError, SearchStats};
use crate::board::{Board, Pos};
use crate::policy::ScoringPolicy;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Exploration constant for the UCB formula.
    pub c_puct: f32,

    /// Wall-clock budget per move in milliseconds. Zero or negative still
    /// runs a single iteration.
    pub duration_ms: i64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            c_puct: 5.0,
            duration_ms: 950,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            c_puct: 5.0,
            duration_ms: 20,
        }
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set the per-move budget.
    pub fn with_duration_ms(mut self, ms: i64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.duration_ms.max(0) as u64)
    }
}

pub struct MctsEngine {
    config: MctsConfig,
    policy: Box<dyn ScoringPolicy>,
    tree: Option<MctsTree>,
    /// Board the current root corresponds to
    root_board: Option<Board>,
    stats: SearchStats,
}

impl MctsEngine {
    pub fn new(config: MctsConfig, policy: Box<dyn ScoringPolicy>) -> Self {
        Self {
            config,
            policy,
            tree: None,
            root_board: None,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Search tree, once the first sync has happened.
    #[inline]
    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }

    /// Statistics of the last search
    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Move the root to the board's position.
    ///
    /// Newly played moves are followed down the existing tree. The tree is
    /// rebuilt when no child matches a move or when the board's history is
    /// not a continuation of the one the root was built for.
    pub fn sync_with_board(&mut self, board: &Board) {
        let continues = self.root_board.as_ref().is_some_and(|known| {
            known.config() == board.config() && board.history().starts_with(known.history())
        });

        if let (true, Some(tree), Some(known)) =
            (continues, self.tree.as_mut(), self.root_board.as_ref())
        {
            for &mv in &board.history()[known.history().len()..] {
                match tree.child(tree.root(), mv) {
                    Some(child) => tree.promote(child),
                    None => {
                        trace!(%mv, "no subtree for move; starting a fresh tree");
                        *tree = MctsTree::new(board.last_move());
                        break;
                    }
                }
            }
        } else {
            if self.tree.is_some() {
                warn!(
                    plies = board.history().len(),
                    "board history diverged from search tree; rebuilding"
                );
            }
            self.tree = Some(MctsTree::new(board.last_move()));
        }
        self.root_board = Some(board.clone());
    }

    /// Search the board's position and return the most visited move.
    pub fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        if board.is_terminal() {
            return Err(EngineError::GameOver);
        }
        self.sync_with_board(board);

        let c_puct = self.config.c_puct;
        let budget = self.config.budget();
        let policy = self.policy.as_ref();
        let tree = self
            .tree
            .get_or_insert_with(|| MctsTree::new(board.last_move()));

        let start = Instant::now();
        let mut scratch = board.clone();
        let mut iterations = 0u32;
        loop {
            run_iteration(tree, policy, &mut scratch, c_puct)?;
            iterations += 1;
            if start.elapsed() >= budget {
                break;
            }
        }

        self.stats = SearchStats {
            iterations,
            duration: start.elapsed(),
            nodes: tree.len(),
        };

        let best = tree.best_child().ok_or(EngineError::NoLegalMoves)?;
        let node = tree.get(best);
        debug!(
            iterations,
            nodes = tree.len(),
            root_visits = tree.get(tree.root()).visit_count,
            best = %node.action,
            visits = node.visit_count,
            q = -node.mean_value(),
            "MCTS search complete"
        );
        Ok(node.action)
    }

    /// `{iterations, duration, nodes}` of the last search
    pub fn debug_message(&self) -> Value {
        json!({
            "iterations": self.stats.iterations,
            "duration": format!("{}ms", self.stats.duration.as_millis()),
            "nodes": self.stats.nodes,
        })
    }

    /// Drop the search tree.
    pub fn reset(&mut self) {
        self.tree = None;
        self.root_board = None;
        self.stats = SearchStats::default();
    }
}

/// One select / expand / backpropagate pass starting at the root.
///
/// `board` is the root position on entry and is restored before returning Ok.
fn run_iteration(
    tree: &mut MctsTree,
    policy: &dyn ScoringPolicy,
    board: &mut Board,
    c_puct: f32,
) -> Result<(), EngineError> {
    let mut node = tree.root();
    let mut depth = 0usize;
    loop {
        let n = tree.get(node);
        if n.is_terminal() || !n.expanded {
            break;
        }
        match tree.select_child(node, c_puct) {
            Some(child) => {
                board.apply_move(tree.get(child).action)?;
                depth += 1;
                node = child;
            }
            None => break,
        }
    }

    let value = match tree.get(node).terminal_value {
        Some(v) => v,
        None if board.winner().is_some() => {
            // The player who just moved won
            tree.get_mut(node).terminal_value = Some(-1.0);
            -1.0
        }
        None if board.is_full() => {
            tree.get_mut(node).terminal_value = Some(0.0);
            0.0
        }
        None => expand(tree, node, policy, board)?,
    };

    tree.backpropagate(node, value);
    trace!(depth, value, "MCTS iteration complete");

    for _ in 0..depth {
        board.undo_move()?;
    }
    Ok(())
}

/// Expand `node` with one policy call. Returns the policy's value estimate.
fn expand(
    tree: &mut MctsTree,
    node: NodeId,
    policy: &dyn ScoringPolicy,
    board: &Board,
) -> Result<f32, EngineError> {
    let output = policy.evaluate(board)?;
    if !output.value.is_finite() {
        return Err(EngineError::InvalidPolicy(format!(
            "non-finite value {}",
            output.value
        )));
    }

    let config = board.config();
    let mut by_cell = vec![0.0f32; config.cells()];
    for &(pos, prior) in &output.priors {
        if !prior.is_finite() || prior < 0.0 {
            return Err(EngineError::InvalidPolicy(format!(
                "prior {prior} for {pos}"
            )));
        }
        if !board.is_legal(pos) {
            return Err(EngineError::InvalidPolicy(format!(
                "prior for illegal move {pos}"
            )));
        }
        by_cell[config.index(pos)] += prior;
    }

    let legal = board.legal_moves();
    let sum: f32 = legal.iter().map(|&m| by_cell[config.index(m)]).sum();
    if sum <= 0.0 || !sum.is_finite() {
        return Err(EngineError::InvalidPolicy(format!("prior sum {sum}")));
    }

    let priors: Vec<(Pos, f32)> = legal
        .into_iter()
        .map(|m| (m, by_cell[config.index(m)] / sum))
        .collect();
    tree.expand(node, &priors);

    Ok(output.value.clamp(-1.0, 1.0))
}
