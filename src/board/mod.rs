//! Board representation for Gomoku

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

/// Default board edge (15x15)
pub const DEFAULT_SIZE: u8 = 15;
/// Stones in a row needed to win
pub const DEFAULT_WIN_LENGTH: u8 = 5;
/// Largest supported board edge. Pattern weights are calibrated against it.
pub const MAX_BOARD_SIZE: u8 = 19;

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Slot of a player in per-player tables (Black = 0, White = 1).
    #[inline]
    pub fn slot(self) -> usize {
        debug_assert!(self != Stone::Empty, "Empty has no player slot");
        match self {
            Stone::White => 1,
            _ => 0,
        }
    }

    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stone::Empty => "empty",
            Stone::Black => "black",
            Stone::White => "white",
        };
        f.write_str(name)
    }
}

/// Position on the board
///
/// Ordering is row-major, which matches flattened index order on any width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    /// Sentinel for "no position", e.g. the move before the first move.
    pub const NONE: Pos = Pos {
        row: u8::MAX,
        col: u8::MAX,
    };

    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("(none)")
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

/// Board geometry, passed explicitly to everything that needs dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    pub win_length: u8,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            win_length: DEFAULT_WIN_LENGTH,
        }
    }
}

impl BoardConfig {
    pub const fn new(width: u8, height: u8, win_length: u8) -> Self {
        Self {
            width,
            height,
            win_length,
        }
    }

    /// Square board with the standard five-in-a-row rule.
    pub const fn square(size: u8) -> Self {
        Self::new(size, size, DEFAULT_WIN_LENGTH)
    }

    #[inline]
    pub fn cells(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < i32::from(self.height) && col >= 0 && col < i32::from(self.width)
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Flattened row-major index. Caller guarantees `pos` is in bounds.
    #[inline]
    pub fn index(&self, pos: Pos) -> usize {
        debug_assert!(self.in_bounds(pos));
        usize::from(pos.row) * usize::from(self.width) + usize::from(pos.col)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pos(&self, idx: usize) -> Pos {
        let width = usize::from(self.width);
        Pos::new((idx / width) as u8, (idx % width) as u8)
    }

    /// Board midpoint
    #[inline]
    pub fn center(&self) -> Pos {
        Pos::new(self.height / 2, self.width / 2)
    }
}

/// Errors raised when a move violates the board contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("cell {0} is already occupied")]
    Occupied(Pos),

    #[error("position {0} is outside the board")]
    OutOfBounds(Pos),

    #[error("the game is already over")]
    GameOver,

    #[error("no move to undo")]
    NothingToUndo,
}
