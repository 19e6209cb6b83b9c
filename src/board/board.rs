//! Board structure with move history

use rand::Rng;

use super::bitboard::Bitboard;
use super::{BoardConfig, BoardError, Pos, Stone};
use crate::rules::has_five_at_pos;

/// Game board: stone placement, player to move, and ordered move history.
///
/// Black always moves first, so the length of the history alone decides
/// whose turn it is. Moves are applied and undone with stack discipline.
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    /// Black stones bitboard
    black: Bitboard,
    /// White stones bitboard
    white: Bitboard,
    history: Vec<Pos>,
    winner: Option<Stone>,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            black: Bitboard::new(config.cells()),
            white: Bitboard::new(config.cells()),
            history: Vec::with_capacity(config.cells()),
            winner: None,
        }
    }

    /// Standard 15x15 five-in-a-row board
    pub fn standard() -> Self {
        Self::new(BoardConfig::default())
    }

    /// Build a board by replaying `moves` from the empty position.
    pub fn from_moves(config: BoardConfig, moves: &[Pos]) -> Result<Self, BoardError> {
        let mut board = Self::new(config);
        for &pos in moves {
            board.apply_move(pos)?;
        }
        Ok(board)
    }

    #[inline]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[inline]
    pub fn width(&self) -> u8 {
        self.config.width
    }

    #[inline]
    pub fn height(&self) -> u8 {
        self.config.height
    }

    /// Get stone at position (Empty when out of bounds)
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if !self.config.in_bounds(pos) {
            return Stone::Empty;
        }
        let idx = self.config.index(pos);
        if self.black.get(idx) {
            Stone::Black
        } else if self.white.get(idx) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is on the board and empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.config.in_bounds(pos) && {
            let idx = self.config.index(pos);
            !self.black.get(idx) && !self.white.get(idx)
        }
    }

    /// Player to move
    #[inline]
    pub fn current_player(&self) -> Stone {
        if self.history.len() % 2 == 0 {
            Stone::Black
        } else {
            Stone::White
        }
    }

    /// Moves applied so far, oldest first
    #[inline]
    pub fn history(&self) -> &[Pos] {
        &self.history
    }

    /// Most recent move, or `Pos::NONE` before the first move
    #[inline]
    pub fn last_move(&self) -> Pos {
        self.history.last().copied().unwrap_or(Pos::NONE)
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.history.len() == self.config.cells()
    }

    /// Won by either side, or drawn on a full board
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }

    /// A move is legal when the game is running and the cell is free.
    #[inline]
    pub fn is_legal(&self, pos: Pos) -> bool {
        !self.is_terminal() && self.is_empty(pos)
    }

    /// Legal moves in row-major order (empty once the game is over)
    pub fn legal_moves(&self) -> Vec<Pos> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..self.config.cells())
            .filter(|&idx| !self.black.get(idx) && !self.white.get(idx))
            .map(|idx| self.config.pos(idx))
            .collect()
    }

    /// Uniformly random legal move
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pos> {
        let moves = self.legal_moves();
        if moves.is_empty() {
            return None;
        }
        Some(moves[rng.gen_range(0..moves.len())])
    }

    /// Place a stone for the player to move and pass the turn.
    pub fn apply_move(&mut self, pos: Pos) -> Result<(), BoardError> {
        if self.is_terminal() {
            return Err(BoardError::GameOver);
        }
        if !self.config.in_bounds(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        if !self.is_empty(pos) {
            return Err(BoardError::Occupied(pos));
        }

        let color = self.current_player();
        let idx = self.config.index(pos);
        match color {
            Stone::White => self.white.set(idx),
            _ => self.black.set(idx),
        }
        self.history.push(pos);

        if has_five_at_pos(self, pos, color) {
            self.winner = Some(color);
        }
        Ok(())
    }

    /// Retract the most recent move.
    pub fn undo_move(&mut self) -> Result<Pos, BoardError> {
        let pos = self.history.pop().ok_or(BoardError::NothingToUndo)?;
        let idx = self.config.index(pos);
        self.black.clear(idx);
        self.white.clear(idx);
        // Moves are never applied after a win, so the prior state was open.
        self.winner = None;
        Ok(pos)
    }

    /// Text diagram, one row per line, `X` for black and `O` for white.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.config.cells() * 2 + 64);
        out.push_str("   ");
        for col in 0..self.width() {
            out.push_str(&format!("{:>2}", col % 100));
        }
        out.push('\n');
        for row in 0..self.height() {
            out.push_str(&format!("{row:>2} "));
            for col in 0..self.width() {
                out.push(' ');
                out.push(self.get(Pos::new(row, col)).symbol());
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
