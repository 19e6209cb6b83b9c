//! Game rules for freestyle Gomoku
//!
//! The only rule beyond alternating placement is the win condition:
//! `win_length` or more stones of one color in a row, in any of the four
//! line directions.

pub mod win;

pub use win::{has_five_at_pos, DIRECTIONS};
