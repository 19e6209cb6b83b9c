//! Agents: the uniform move-selection interface used by the game driver.
//!
//! Every agent answers `get_action` for the player to move. Search agents
//! also follow the game through `sync_with_board` so their trees carry over
//! from one turn to the next.

use std::fmt;

use clap::ValueEnum;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde_json::{json, Value};

use crate::board::{Board, Pos};
use crate::config::EngineConfig;
use crate::eval::PatternEvaluator;
use crate::policy::PatternPolicy;
use crate::search::{EngineError, MctsConfig, MctsEngine, MinimaxConfig, MinimaxEngine};

pub trait Agent {
    /// Display name, including the settings that tell instances apart
    fn name(&self) -> String;

    /// Choose a move for the player to move on `board`.
    fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError>;

    /// Diagnostics about the last decision. Side channel only.
    fn debug_message(&self) -> Value {
        Value::Null
    }

    /// Follow moves played since the last call.
    fn sync_with_board(&mut self, _board: &Board) -> Result<(), EngineError> {
        Ok(())
    }

    /// Forget all state carried between turns.
    fn reset(&mut self) {}
}

/// Uniformly random legal moves.
pub struct RandomAgent {
    rng: ChaCha20Rng,
    seed: u64,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> String {
        "RandomAgent".to_string()
    }

    fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        if board.is_terminal() {
            return Err(EngineError::GameOver);
        }
        board.random_move(&mut self.rng).ok_or(EngineError::NoLegalMoves)
    }

    fn reset(&mut self) {
        self.rng = ChaCha20Rng::seed_from_u64(self.seed);
    }
}

/// One-ply heuristic player: the most probable cell after the decisive filter.
#[derive(Default)]
pub struct PatternEvalAgent {
    evaluator: Option<PatternEvaluator>,
}

impl PatternEvalAgent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Agent for PatternEvalAgent {
    fn name(&self) -> String {
        "PatternEvalAgent".to_string()
    }

    fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        if board.is_terminal() {
            return Err(EngineError::GameOver);
        }
        self.sync_with_board(board)?;
        let evaluator = self
            .evaluator
            .get_or_insert_with(|| PatternEvaluator::new(*board.config()));

        let probs = evaluator.decisive_filter(&evaluator.evaluation_probs(board.current_player()));
        let config = board.config();
        let mut best: Option<(Pos, f32)> = None;
        for pos in board.legal_moves() {
            let p = probs[config.index(pos)];
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((pos, p));
            }
        }
        best.map(|(pos, _)| pos).ok_or(EngineError::NoLegalMoves)
    }

    fn debug_message(&self) -> Value {
        match &self.evaluator {
            Some(evaluator) => json!({ "patterns": evaluator.distribution() }),
            None => Value::Null,
        }
    }

    fn sync_with_board(&mut self, board: &Board) -> Result<(), EngineError> {
        self.evaluator
            .get_or_insert_with(|| PatternEvaluator::new(*board.config()))
            .sync_with_board(board)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.evaluator = None;
    }
}

/// MCTS guided by the pattern policy.
pub struct MctsAgent {
    engine: MctsEngine,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            engine: MctsEngine::new(config, Box::new(PatternPolicy::new())),
        }
    }

    /// Agent around an engine with a custom policy
    pub fn with_engine(engine: MctsEngine) -> Self {
        Self { engine }
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> String {
        format!("MCTSAgent:{}ms", self.engine.config().duration_ms)
    }

    fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        self.engine.get_action(board)
    }

    fn debug_message(&self) -> Value {
        self.engine.debug_message()
    }

    fn sync_with_board(&mut self, board: &Board) -> Result<(), EngineError> {
        self.engine.sync_with_board(board);
        Ok(())
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}

/// Alpha-beta search over pattern evaluations.
pub struct MinimaxAgent {
    engine: MinimaxEngine,
}

impl MinimaxAgent {
    pub fn new(config: MinimaxConfig) -> Self {
        Self {
            engine: MinimaxEngine::new(config),
        }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> String {
        format!("MinimaxAgent:depth{}", self.engine.config().max_depth)
    }

    fn get_action(&mut self, board: &Board) -> Result<Pos, EngineError> {
        self.engine.get_action(board)
    }

    fn debug_message(&self) -> Value {
        self.engine.debug_message()
    }

    fn sync_with_board(&mut self, board: &Board) -> Result<(), EngineError> {
        self.engine.sync_with_board(board)
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}

/// The available agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Random,
    PatternEval,
    Mcts,
    Minimax,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Random => "random",
            AgentKind::PatternEval => "pattern-eval",
            AgentKind::Mcts => "mcts",
            AgentKind::Minimax => "minimax",
        };
        f.write_str(name)
    }
}

/// Build an agent of `kind` from the engine settings. `seed` drives the
/// random agent.
pub fn build_agent(kind: AgentKind, config: &EngineConfig, seed: u64) -> Box<dyn Agent> {
    match kind {
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
        AgentKind::PatternEval => Box::new(PatternEvalAgent::new()),
        AgentKind::Mcts => Box::new(MctsAgent::new(config.mcts)),
        AgentKind::Minimax => Box::new(MinimaxAgent::new(config.minimax)),
    }
}
