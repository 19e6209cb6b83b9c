//! Game driver connecting two agents to a board
//!
//! Each turn both agents are synced to the board, the player to move picks an
//! action, and the move is applied. The loop ends on a win or a full board.
//!
//! # Example
//!
//! ```
//! use gomoku::agent::{PatternEvalAgent, RandomAgent};
//! use gomoku::board::BoardConfig;
//! use gomoku::engine::play_game;
//!
//! let mut black = PatternEvalAgent::new();
//! let mut white = RandomAgent::new(7);
//! let record = play_game(BoardConfig::square(9), &mut black, &mut white).unwrap();
//! assert!(record.board.is_terminal());
//! println!("{}", record.board.render());
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::agent::Agent;
use crate::board::{Board, BoardConfig, Pos, Stone};
use crate::search::EngineError;

/// A finished game
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Final position, history included
    pub board: Board,
    /// `None` for a draw
    pub winner: Option<Stone>,
    /// Thinking time per move, in move order
    pub move_times: Vec<Duration>,
}

impl GameRecord {
    #[inline]
    pub fn moves(&self) -> &[Pos] {
        self.board.history()
    }
}

/// Play one game from the empty board, `black` moving first.
pub fn play_game(
    config: BoardConfig,
    black: &mut dyn Agent,
    white: &mut dyn Agent,
) -> Result<GameRecord, EngineError> {
    let mut board = Board::new(config);
    let mut move_times = Vec::new();

    info!(black = %black.name(), white = %white.name(), "game start");

    while !board.is_terminal() {
        black.sync_with_board(&board)?;
        white.sync_with_board(&board)?;

        let player = board.current_player();
        let agent: &mut dyn Agent = match player {
            Stone::White => &mut *white,
            _ => &mut *black,
        };

        let start = Instant::now();
        let mv = agent.get_action(&board)?;
        let elapsed = start.elapsed();
        board.apply_move(mv)?;
        move_times.push(elapsed);

        info!(
            ply = board.stone_count(),
            %player,
            %mv,
            ms = elapsed.as_millis() as u64,
            "move"
        );
        debug!(agent = %agent.name(), debug = %agent.debug_message(), "agent diagnostics");
    }

    let winner = board.winner();
    match winner {
        Some(stone) => info!(winner = %stone, plies = board.stone_count(), "game over"),
        None => info!(plies = board.stone_count(), "game drawn"),
    }

    Ok(GameRecord {
        board,
        winner,
        move_times,
    })
}
