//! Depth-bounded negamax with alpha-beta pruning.
//!
//! The search keeps its game tree between turns. Each node owns its children,
//! so promoting the child for a played move keeps that subtree and drops the
//! siblings. Nodes remember their static evaluation, their last backed-up
//! score with its bound type, and the order in which children scored, so a
//! reused subtree is searched in a better order and can answer from cache
//! when the remaining depth matches exactly.
//!
//! A node's score depends only on its position and the remaining depth:
//! wins found with more depth left score higher, and nothing depends on the
//! distance from the root.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::EngineError;
use crate::board::{Board, Pos, Stone};
use crate::eval::{PatternEvaluator, PatternScore};

/// Score of a won position at zero remaining depth
pub const WIN_SCORE: i64 = 10 * PatternScore::FIVE;

/// Infinity score for alpha-beta bounds
const INF: i64 = 2 * WIN_SCORE;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MinimaxConfig {
    /// Plies searched from the root
    pub max_depth: u8,
    /// Children generated per node, best-ordered first
    pub max_candidates: usize,
    /// Alpha-beta cutoffs. Disabling only costs time.
    pub pruning: bool,
    /// Candidate moves lie within this many cells of an existing stone
    pub neighborhood: u8,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_candidates: 12,
            pruning: true,
            neighborhood: 2,
        }
    }
}

impl MinimaxConfig {
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_candidates(mut self, n: usize) -> Self {
        self.max_candidates = n;
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }
}

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Exact score - the search completed normally
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    Lower,
    /// Upper bound - score <= stored value (alpha fail-low)
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Open,
    /// The player to move has lost
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy)]
struct Cached {
    depth: u8,
    score: i64,
    bound: Bound,
}

/// Node of the reusable game tree. Scores are for the player to move.
#[derive(Debug)]
pub struct MinimaxNode {
    action: Pos,
    static_eval: Option<i64>,
    cached: Option<Cached>,
    outcome: Option<Outcome>,
    /// Score this node got from its parent's last search, for ordering
    order_score: Option<i64>,
    children: Option<Vec<MinimaxNode>>,
    best_move: Pos,
}

impl MinimaxNode {
    fn new(action: Pos) -> Self {
        Self {
            action,
            static_eval: None,
            cached: None,
            outcome: None,
            order_score: None,
            children: None,
            best_move: Pos::NONE,
        }
    }

    /// Move that led to this node
    pub fn action(&self) -> Pos {
        self.action
    }

    /// Best move found by the last search through this node
    pub fn best_move(&self) -> Pos {
        self.best_move
    }

    /// Generated children, in current search order
    pub fn children(&self) -> &[MinimaxNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Remaining depth and score of the last search, if any
    pub fn cached(&self) -> Option<(u8, i64, Bound)> {
        self.cached.map(|c| (c.depth, c.score, c.bound))
    }

    pub fn static_eval(&self) -> Option<i64> {
        self.static_eval
    }

    /// Detach the child reached by `mv`, dropping its siblings.
    fn take_child(&mut self, mv: Pos) -> Option<MinimaxNode> {
        self.children
            .take()
            .and_then(|children| children.into_iter().find(|c| c.action == mv))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinimaxStats {
    pub depth: u8,
    pub nodes: u64,
    pub score: i64,
    pub duration: Duration,
}

/// Per-search state threaded through the recursion
struct Search<'a> {
    config: &'a MinimaxConfig,
    evaluator: &'a mut PatternEvaluator,
    nodes: u64,
}

pub struct MinimaxEngine {
    config: MinimaxConfig,
    evaluator: Option<PatternEvaluator>,
    tree: Option<MinimaxNode>,
    root_board: Option<Board>,
    stats: MinimaxStats,
}

impl MinimaxEngine {
    pub fn new(config: MinimaxConfig) -> Self {
        Self {
            config,
            evaluator: None,
            tree: None,
            root_board: None,
            stats: MinimaxStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &MinimaxConfig {
        &self.config
    }

    #[inline]
    pub fn tree(&self) -> Option<&MinimaxNode> {
        self.tree.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &MinimaxStats {
        &self.stats
    }

    /// Align the evaluator and the tree root with the board.
    pub fn sync_with_board(&mut self, board: &Board) -> Result<(), EngineError> {
        self.evaluator
            .get_or_insert_with(|| PatternEvaluator::new(*board.config()))
            .sync_with_board(board)?;

        let continues = self.root_board.as_ref().is_some_and(|known| {
            known.config() == board.config() && board.history().starts_with(known.history())
        });

        if let (true, Some(root), Some(known)) =
            (continues, self.tree.as_mut(), self.root_board.as_ref())
        {
            for &mv in &board.history()[known.history().len()..] {
                *root = root
                    .take_child(mv)
                    .unwrap_or_else(|| MinimaxNode::new(board.last_move()));
            }
            // A missing child above leaves a fresh root named after an older move
            root.action = board.last_move();
        } else {
            if self.tree.is_some() {
                warn!(
                    plies = board.history().len(),
                    "board history diverged from minimax tree; rebuilding"
                );
            }
            self.tree = Some(MinimaxNode::new(board.last_move()));
        }
        self.root_board = Some(board.clone());
        Ok(())
    }

    /// Search to the configured depth and return the best root move.
    pub fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        if board.is_terminal() {
            return Err(EngineError::GameOver);
        }
        self.sync_with_board(board)?;

        let start = Instant::now();
        let depth = self.config.max_depth.max(1);
        let evaluator = self
            .evaluator
            .get_or_insert_with(|| PatternEvaluator::new(*board.config()));
        let root = self
            .tree
            .get_or_insert_with(|| MinimaxNode::new(board.last_move()));

        let mut search = Search {
            config: &self.config,
            evaluator,
            nodes: 0,
        };
        let score = search.negamax(root, depth, -INF, INF)?;

        self.stats = MinimaxStats {
            depth,
            nodes: search.nodes,
            score,
            duration: start.elapsed(),
        };

        if root.best_move.is_none() {
            return Err(EngineError::NoLegalMoves);
        }
        debug!(
            depth,
            nodes = search.nodes,
            score,
            best = %root.best_move,
            "minimax search complete"
        );
        Ok(root.best_move)
    }

    /// `{depth, nodes, score, duration}` of the last search
    pub fn debug_message(&self) -> Value {
        json!({
            "depth": self.stats.depth,
            "nodes": self.stats.nodes,
            "score": self.stats.score,
            "duration": format!("{}ms", self.stats.duration.as_millis()),
        })
    }

    pub fn reset(&mut self) {
        self.evaluator = None;
        self.tree = None;
        self.root_board = None;
        self.stats = MinimaxStats::default();
    }
}

impl Search<'_> {
    fn negamax(
        &mut self,
        node: &mut MinimaxNode,
        depth: u8,
        mut alpha: i64,
        beta: i64,
    ) -> Result<i64, EngineError> {
        self.nodes += 1;

        let outcome = *node.outcome.get_or_insert_with(|| outcome_of(self.evaluator));
        match outcome {
            Outcome::Loss => return Ok(-(WIN_SCORE + i64::from(depth))),
            Outcome::Draw => return Ok(0),
            Outcome::Open => {}
        }

        if depth == 0 {
            let mover = self.evaluator.current_player();
            let evaluator = &*self.evaluator;
            return Ok(*node
                .static_eval
                .get_or_insert_with(|| evaluator.evaluation_value(mover)));
        }

        if let Some(c) = node.cached.filter(|c| c.depth == depth) {
            match c.bound {
                Bound::Exact => return Ok(c.score),
                Bound::Lower if c.score >= beta => return Ok(c.score),
                Bound::Upper if c.score <= alpha => return Ok(c.score),
                _ => {}
            }
        }

        if node.children.is_none() {
            node.children = Some(
                self.candidates()
                    .into_iter()
                    .map(MinimaxNode::new)
                    .collect(),
            );
        }

        let alpha_orig = alpha;
        let mut best = -INF;
        let mut best_move = Pos::NONE;
        let children = node.children.get_or_insert_with(Vec::new);
        for child in children.iter_mut() {
            let (a, b) = if self.config.pruning {
                (-beta, -alpha)
            } else {
                (-INF, INF)
            };
            self.evaluator.apply_move(child.action)?;
            let result = self.negamax(child, depth - 1, a, b);
            self.evaluator.undo_move()?;
            let score = -result?;

            child.order_score = Some(score);
            if score > best {
                best = score;
                best_move = child.action;
            }
            if best > alpha {
                alpha = best;
            }
            if self.config.pruning && alpha >= beta {
                break;
            }
        }
        // Children that scored best for this node go first next time
        children.sort_by_key(|c| Reverse(c.order_score.unwrap_or(i64::MIN)));

        let bound = if best <= alpha_orig {
            Bound::Upper
        } else if best >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        node.cached = Some(Cached {
            depth,
            score: best,
            bound,
        });
        node.best_move = best_move;
        Ok(best)
    }

    /// Ordered candidate moves for the player to move.
    ///
    /// Empty cells near existing stones, ranked by the decisive-filtered
    /// pattern probabilities. When a win or a forced block exists only those
    /// cells remain.
    fn candidates(&self) -> Vec<Pos> {
        let evaluator = &*self.evaluator;
        let config = *evaluator.config();
        if evaluator.history().is_empty() {
            return vec![config.center()];
        }

        let mover = evaluator.current_player();
        let probs = evaluator.decisive_filter(&evaluator.evaluation_probs(mover));

        let reach = i32::from(self.config.neighborhood);
        let near_stone = |pos: Pos| {
            let (r, c) = (i32::from(pos.row), i32::from(pos.col));
            (-reach..=reach).any(|dr| {
                (-reach..=reach).any(|dc| {
                    config.contains(r + dr, c + dc)
                        && evaluator.get(Pos::new((r + dr) as u8, (c + dc) as u8)) != Stone::Empty
                })
            })
        };

        let empty: Vec<usize> = (0..config.cells())
            .filter(|&idx| probs[idx] > 0.0 && evaluator.get(config.pos(idx)) == Stone::Empty)
            .collect();
        let mut moves: Vec<usize> = empty
            .iter()
            .copied()
            .filter(|&idx| near_stone(config.pos(idx)))
            .collect();
        if moves.is_empty() {
            moves = empty;
        }

        moves.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]).then(a.cmp(&b)));
        moves.truncate(self.config.max_candidates.max(1));
        moves.into_iter().map(|idx| config.pos(idx)).collect()
    }
}

fn outcome_of(evaluator: &PatternEvaluator) -> Outcome {
    let just_moved = evaluator.current_player().opponent();
    if evaluator.has_five(just_moved) {
        Outcome::Loss
    } else if evaluator.is_full() {
        Outcome::Draw
    } else {
        Outcome::Open
    }
}
