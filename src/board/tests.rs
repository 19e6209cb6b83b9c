use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::*;

fn board_with(moves: &[(u8, u8)]) -> Board {
    let moves: Vec<Pos> = moves.iter().map(|&(r, c)| Pos::new(r, c)).collect();
    Board::from_moves(BoardConfig::default(), &moves).unwrap()
}

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_pos_ordering() {
    let pos1 = Pos::new(0, 0);
    let pos2 = Pos::new(0, 1);
    let pos3 = Pos::new(1, 0);

    assert!(pos1 < pos2);
    assert!(pos2 < pos3);
    assert!(pos1 < pos3);
}

#[test]
fn test_pos_sentinel() {
    assert!(Pos::NONE.is_none());
    assert!(Pos::new(0, 0).is_some());
    assert!(!BoardConfig::default().in_bounds(Pos::NONE));
    assert_eq!(Pos::NONE.to_string(), "(none)");
}

#[test]
fn test_index_conversion() {
    let config = BoardConfig::new(9, 7, 5);
    assert_eq!(config.cells(), 63);
    // Top-left, top-right, bottom-left, bottom-right
    assert_eq!(config.index(Pos::new(0, 0)), 0);
    assert_eq!(config.index(Pos::new(0, 8)), 8);
    assert_eq!(config.index(Pos::new(6, 0)), 54);
    assert_eq!(config.index(Pos::new(6, 8)), 62);
    for idx in 0..config.cells() {
        assert_eq!(config.index(config.pos(idx)), idx);
    }
}

#[test]
fn test_center() {
    assert_eq!(BoardConfig::default().center(), Pos::new(7, 7));
    assert_eq!(BoardConfig::new(10, 6, 4).center(), Pos::new(3, 5));
}

#[test]
fn test_bitboard_across_words() {
    let mut bb = Bitboard::new(361);
    bb.set(0);
    bb.set(63);
    bb.set(64);
    bb.set(360);
    let set: Vec<usize> = (0..361).filter(|&i| bb.get(i)).collect();
    assert_eq!(set, vec![0, 63, 64, 360]);
    bb.clear(63);
    assert!(!bb.get(63));
    assert!(bb.get(64));
    assert!(!bb.get(1000));
}

#[test]
fn test_new_board_empty() {
    let board = Board::standard();
    assert_eq!(board.current_player(), Stone::Black);
    assert_eq!(board.stone_count(), 0);
    assert_eq!(board.last_move(), Pos::NONE);
    assert_eq!(board.legal_moves().len(), 225);
    assert!(!board.is_terminal());
}

#[test]
fn test_players_alternate() {
    let mut board = Board::standard();
    board.apply_move(Pos::new(7, 7)).unwrap();
    assert_eq!(board.get(Pos::new(7, 7)), Stone::Black);
    assert_eq!(board.current_player(), Stone::White);
    board.apply_move(Pos::new(7, 8)).unwrap();
    assert_eq!(board.get(Pos::new(7, 8)), Stone::White);
    assert_eq!(board.current_player(), Stone::Black);
    assert_eq!(board.history(), &[Pos::new(7, 7), Pos::new(7, 8)]);
    assert_eq!(board.last_move(), Pos::new(7, 8));
}

#[test]
fn test_illegal_moves_rejected() {
    let mut board = board_with(&[(7, 7)]);
    assert_eq!(
        board.apply_move(Pos::new(7, 7)),
        Err(BoardError::Occupied(Pos::new(7, 7)))
    );
    assert_eq!(
        board.apply_move(Pos::new(15, 0)),
        Err(BoardError::OutOfBounds(Pos::new(15, 0)))
    );
    assert_eq!(board.stone_count(), 1);
    assert_eq!(board.current_player(), Stone::White);
}

#[test]
fn test_undo_restores_state() {
    let mut board = board_with(&[(7, 7), (8, 8)]);
    assert_eq!(board.undo_move(), Ok(Pos::new(8, 8)));
    assert!(board.is_empty(Pos::new(8, 8)));
    assert_eq!(board.current_player(), Stone::White);
    assert_eq!(board.undo_move(), Ok(Pos::new(7, 7)));
    assert_eq!(board.undo_move(), Err(BoardError::NothingToUndo));
}

#[test]
fn test_five_wins_and_ends_game() {
    // Black builds a row on 3, White answers on 5
    let board = board_with(&[
        (3, 0),
        (5, 0),
        (3, 1),
        (5, 1),
        (3, 2),
        (5, 2),
        (3, 3),
        (5, 3),
        (3, 4),
    ]);
    assert_eq!(board.winner(), Some(Stone::Black));
    assert!(board.is_terminal());
    assert!(board.legal_moves().is_empty());

    let mut board = board;
    assert_eq!(board.apply_move(Pos::new(5, 4)), Err(BoardError::GameOver));
    board.undo_move().unwrap();
    assert_eq!(board.winner(), None);
}

#[test]
fn test_full_board_is_draw() {
    // 3x3 with win length 3, no line completed
    let config = BoardConfig::new(3, 3, 3);
    let moves = [
        Pos::new(0, 0),
        Pos::new(0, 1),
        Pos::new(0, 2),
        Pos::new(1, 1),
        Pos::new(1, 0),
        Pos::new(1, 2),
        Pos::new(2, 1),
        Pos::new(2, 0),
        Pos::new(2, 2),
    ];
    let board = Board::from_moves(config, &moves).unwrap();
    assert!(board.is_full());
    assert!(board.is_terminal());
    assert_eq!(board.winner(), None);
}

#[test]
fn test_random_move_is_legal() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut board = Board::new(BoardConfig::new(4, 4, 4));
    while let Some(pos) = board.random_move(&mut rng) {
        assert!(board.is_legal(pos));
        board.apply_move(pos).unwrap();
    }
    assert!(board.is_terminal());
}

#[test]
fn test_render() {
    let board = Board::from_moves(BoardConfig::new(3, 2, 2), &[Pos::new(0, 1), Pos::new(1, 2)])
        .unwrap();
    let text = board.render();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], " 0  . X .");
    assert_eq!(lines[2], " 1  . . O");
}
