//! Gomoku decision engines
//!
//! Move selection for freestyle five-in-a-row on a configurable board:
//! - Default 15x15 board, any size up to 19x19
//! - `win_length` in a row wins (overlines count), 5 by default
//! - Black moves first; no captures, no forbidden moves
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - [`board`]: Board representation with bitboards and move history
//! - [`rules`]: Win detection
//! - [`eval`]: Incremental pattern evaluator and move heuristics
//! - [`policy`]: Scoring policies that guide the tree search
//! - [`search`]: MCTS and alpha-beta minimax, both reusing their trees
//! - [`agent`]: The `Agent` interface and its implementations
//! - [`engine`]: Game driver playing two agents against each other
//! - [`config`]: TOML configuration
//!
//! # Quick Start
//!
//! ```
//! use gomoku::agent::{Agent, MinimaxAgent};
//! use gomoku::search::MinimaxConfig;
//! use gomoku::{Board, Pos};
//!
//! let mut board = Board::standard();
//! board.apply_move(Pos::new(7, 7)).unwrap();
//!
//! // Shallow search for a fast doc test
//! let mut agent = MinimaxAgent::new(MinimaxConfig::default().with_depth(1));
//! let mv = agent.get_action(&board).unwrap();
//! board.apply_move(mv).unwrap();
//! println!("{} plays {}", agent.name(), mv);
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod policy;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use agent::{build_agent, Agent, AgentKind};
pub use board::{Board, BoardConfig, BoardError, Pos, Stone};
pub use config::{load_config, EngineConfig};
pub use engine::{play_game, GameRecord};
pub use search::EngineError;
