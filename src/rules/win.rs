//! Win condition checking
//!
//! A player wins with `win_length` or more stones in a row. Overlines count.

use crate::board::{Board, Pos, Stone};

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Count consecutive `color` stones from `pos` (exclusive) along one direction.
fn run_length(board: &Board, pos: Pos, dr: i32, dc: i32, color: Stone) -> i32 {
    let config = board.config();
    let mut count = 0;
    let mut r = i32::from(pos.row) + dr;
    let mut c = i32::from(pos.col) + dc;
    while config.contains(r, c) && board.get(Pos::new(r as u8, c as u8)) == color {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

/// Fast win check through a single cell.
///
/// Counts `pos` itself plus the `color` neighbours along each direction, so it
/// also answers "would a stone here win" for an empty cell.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos, color: Stone) -> bool {
    let need = i32::from(board.config().win_length);
    DIRECTIONS.iter().any(|&(dr, dc)| {
        1 + run_length(board, pos, dr, dc, color) + run_length(board, pos, -dr, -dc, color) >= need
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfig;

    /// Place stones directly, alternating colors as needed with filler moves.
    fn board_from(black: &[(u8, u8)], white: &[(u8, u8)], config: BoardConfig) -> Board {
        let mut board = Board::new(config);
        let mut b = black.iter();
        let mut w = white.iter();
        loop {
            let next = match board.current_player() {
                Stone::Black => b.next(),
                _ => w.next(),
            };
            match next {
                Some(&(r, c)) => board.apply_move(Pos::new(r, c)).unwrap(),
                None => break,
            }
        }
        board
    }

    #[test]
    fn test_five_in_row_horizontal() {
        let board = board_from(
            &[(9, 0), (9, 1), (9, 2), (9, 3), (9, 4)],
            &[(0, 0), (0, 2), (0, 4), (0, 6)],
            BoardConfig::default(),
        );
        assert_eq!(board.winner(), Some(Stone::Black));
        assert!(has_five_at_pos(&board, Pos::new(9, 2), Stone::Black));
        assert!(!has_five_at_pos(&board, Pos::new(0, 2), Stone::White));
    }

    #[test]
    fn test_five_in_row_diagonal() {
        let board = board_from(
            &[(0, 14), (2, 14), (4, 14), (6, 14), (10, 0)],
            &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)],
            BoardConfig::default(),
        );
        assert_eq!(board.winner(), Some(Stone::White));
    }

    #[test]
    fn test_anti_diagonal_from_right_edge() {
        let board = board_from(
            &[(0, 14), (1, 13), (2, 12), (3, 11), (4, 10)],
            &[(14, 0), (14, 2), (14, 4), (14, 6)],
            BoardConfig::default(),
        );
        assert_eq!(board.winner(), Some(Stone::Black));
        assert!(has_five_at_pos(&board, Pos::new(0, 14), Stone::Black));
    }

    #[test]
    fn test_four_in_row_not_win() {
        let board = board_from(
            &[(9, 0), (9, 1), (9, 2), (9, 3)],
            &[(0, 0), (0, 2), (0, 4)],
            BoardConfig::default(),
        );
        assert_eq!(board.winner(), None);
        // Hypothetical completion on the empty end
        assert!(has_five_at_pos(&board, Pos::new(9, 4), Stone::Black));
        assert!(!has_five_at_pos(&board, Pos::new(9, 5), Stone::Black));
    }

    #[test]
    fn test_custom_win_length() {
        let board = board_from(
            &[(1, 1), (2, 2), (3, 3)],
            &[(0, 4), (4, 0)],
            BoardConfig::new(5, 5, 3),
        );
        assert_eq!(board.winner(), Some(Stone::Black));
    }
}
