//! Move scoring on top of the incremental evaluator
//!
//! - `evaluation_probs`: attack + defense + centrality per empty cell
//! - `decisive_filter`: immediate wins and forced blocks
//! - `evaluation_value`: static score for search leaves

use super::evaluator::PatternEvaluator;
use super::patterns::{Pattern, PatternScore};
use crate::board::{Pos, Stone};

/// Share of the opponent's gain counted as defensive value
const DEFENSE_WEIGHT: f64 = 0.8;

impl PatternEvaluator {
    /// Pattern value `player` would add by playing the empty cell `idx`.
    ///
    /// Only the four lines through the cell are reclassified. Lines that gain
    /// a four or an open three feed the multi-line combination bonuses.
    pub fn cell_gain(&self, idx: usize, player: Stone) -> i64 {
        let slot = player.slot();
        let mut gain = 0;
        let mut fours = 0;
        let mut threes = 0;

        for &(id, offset) in self.cell_lines(idx) {
            let before = self.line_patterns(id)[slot];
            let after = self.classify(id, Some((offset, player)))[slot];
            gain += after.score() - before.score();
            if after.fours() > before.fours() {
                fours += 1;
            } else if after.get(Pattern::OpenThree) > before.get(Pattern::OpenThree) {
                threes += 1;
            }
        }

        gain + if fours >= 2 {
            PatternScore::DOUBLE_FOUR
        } else if fours == 1 && threes >= 1 {
            PatternScore::FOUR_THREE
        } else if threes >= 2 {
            PatternScore::DOUBLE_THREE
        } else {
            0
        }
    }

    /// Move distribution over the board's cells for `player`.
    ///
    /// Occupied cells get zero. The rest sum to one. Every empty cell keeps
    /// some mass through the centrality prior.
    pub fn evaluation_probs(&self, player: Stone) -> Vec<f32> {
        let config = *self.config();
        let center = config.center();
        let max_dist = f64::from(config.width) + f64::from(config.height);
        let opponent = player.opponent();

        let mut raw = vec![0.0f64; config.cells()];
        let mut total = 0.0;
        for (idx, cell) in self.cells().iter().enumerate() {
            if *cell != Stone::Empty {
                continue;
            }
            let pos = config.pos(idx);
            let dist = f64::from(pos.row.abs_diff(center.row)) + f64::from(pos.col.abs_diff(center.col));
            let attack = self.cell_gain(idx, player).max(0) as f64;
            let defense = self.cell_gain(idx, opponent).max(0) as f64;
            let score = attack + DEFENSE_WEIGHT * defense + 1.0 + (max_dist - dist);
            raw[idx] = score;
            total += score;
        }

        if total <= 0.0 {
            return vec![0.0; config.cells()];
        }
        raw.into_iter().map(|s| (s / total) as f32).collect()
    }

    /// Empty cells where `player` would complete a winning run
    pub fn winning_cells(&self, player: Stone) -> Vec<Pos> {
        self.winning_indices(player)
            .into_iter()
            .map(|idx| self.config().pos(idx))
            .collect()
    }

    fn winning_indices(&self, player: Stone) -> Vec<usize> {
        let cells = self.cells();
        let need = usize::from(self.config().win_length);
        (0..cells.len())
            .filter(|&idx| cells[idx] == Stone::Empty)
            .filter(|&idx| {
                self.cell_lines(idx).iter().any(|&(id, offset)| {
                    let line = self.line(id);
                    let left = line[..offset]
                        .iter()
                        .rev()
                        .take_while(|&&c| cells[c] == player)
                        .count();
                    let right = line[offset + 1..]
                        .iter()
                        .take_while(|&&c| cells[c] == player)
                        .count();
                    left + 1 + right >= need
                })
            })
            .collect()
    }

    /// Reshape `probs` around immediate wins and forced blocks.
    ///
    /// A mover with a winning cell plays it (the most probable one, lowest
    /// index on ties). Otherwise, if the opponent threatens to win, only the
    /// blocking cells keep mass.
    pub fn decisive_filter(&self, probs: &[f32]) -> Vec<f32> {
        let mover = self.current_player();

        let wins = self.winning_indices(mover);
        if let Some(&first) = wins.first() {
            let mut best = first;
            for &idx in &wins[1..] {
                if probs[idx] > probs[best] {
                    best = idx;
                }
            }
            let mut out = vec![0.0; probs.len()];
            out[best] = 1.0;
            return out;
        }

        let blocks = self.winning_indices(mover.opponent());
        if blocks.is_empty() {
            return probs.to_vec();
        }
        let mass: f32 = blocks.iter().map(|&idx| probs[idx]).sum();
        let mut out = vec![0.0; probs.len()];
        for &idx in &blocks {
            out[idx] = if mass > 0.0 {
                probs[idx] / mass
            } else {
                1.0 / blocks.len() as f32
            };
        }
        out
    }

    /// Static score, positive when `player` is ahead
    pub fn evaluation_value(&self, player: Stone) -> i64 {
        let dist = self.distribution();
        dist.get(player).score() - dist.get(player.opponent()).score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfig;

    fn eval_with(moves: &[(u8, u8)]) -> PatternEvaluator {
        let mut eval = PatternEvaluator::new(BoardConfig::default());
        for &(r, c) in moves {
            eval.apply_move(Pos::new(r, c)).unwrap();
        }
        eval
    }

    fn argmax(probs: &[f32]) -> usize {
        let mut best = 0;
        for (idx, &p) in probs.iter().enumerate() {
            if p > probs[best] {
                best = idx;
            }
        }
        best
    }

    #[test]
    fn test_empty_board_prefers_center() {
        let eval = eval_with(&[]);
        let probs = eval.evaluation_probs(Stone::Black);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        let center = BoardConfig::default().index(Pos::new(7, 7));
        assert_eq!(argmax(&probs), center);
        let runner_up = probs
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != center)
            .map(|(_, &p)| p)
            .fold(0.0f32, f32::max);
        assert!(probs[center] > runner_up);
    }

    #[test]
    fn test_occupied_cells_get_zero() {
        let eval = eval_with(&[(7, 7), (7, 8)]);
        let probs = eval.evaluation_probs(Stone::Black);
        let config = BoardConfig::default();
        assert_eq!(probs[config.index(Pos::new(7, 7))], 0.0);
        assert_eq!(probs[config.index(Pos::new(7, 8))], 0.0);
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_filter_takes_single_win() {
        // Black: (7,3)..(7,6), blocked on the left; White scattered
        let eval = eval_with(&[
            (7, 3),
            (7, 2),
            (7, 4),
            (0, 0),
            (7, 5),
            (14, 0),
            (7, 6),
            (14, 14),
        ]);
        assert_eq!(eval.winning_cells(Stone::Black), vec![Pos::new(7, 7)]);
        let probs = eval.evaluation_probs(Stone::Black);
        let filtered = eval.decisive_filter(&probs);
        let win = BoardConfig::default().index(Pos::new(7, 7));
        assert_eq!(filtered[win], 1.0);
        assert_eq!(filtered.iter().filter(|&&p| p > 0.0).count(), 1);
    }

    #[test]
    fn test_filter_blocks_single_threat() {
        // Same shape, but White to move must block
        let eval = eval_with(&[(7, 3), (7, 2), (7, 4), (0, 0), (7, 5), (14, 0), (7, 6)]);
        assert_eq!(eval.current_player(), Stone::White);
        assert!(eval.winning_cells(Stone::White).is_empty());
        let probs = eval.evaluation_probs(Stone::White);
        let filtered = eval.decisive_filter(&probs);
        let block = BoardConfig::default().index(Pos::new(7, 7));
        assert!((filtered[block] - 1.0).abs() < 1e-6);
        assert_eq!(argmax(&filtered), block);
    }

    #[test]
    fn test_filter_passthrough_without_threats() {
        let eval = eval_with(&[(7, 7), (8, 8)]);
        let probs = eval.evaluation_probs(Stone::Black);
        assert_eq!(eval.decisive_filter(&probs), probs);
    }

    #[test]
    fn test_open_four_completion_preferred() {
        let eval = eval_with(&[(7, 4), (0, 0), (7, 5), (0, 14), (7, 6), (14, 0)]);
        let probs = eval.evaluation_probs(Stone::Black);
        let config = BoardConfig::default();
        let best = argmax(&probs);
        assert!(
            best == config.index(Pos::new(7, 3)) || best == config.index(Pos::new(7, 7)),
            "expected open four extension, got {}",
            config.pos(best)
        );
    }

    #[test]
    fn test_value_antisymmetric() {
        let eval = eval_with(&[(7, 7), (7, 8), (8, 8), (9, 9), (6, 6)]);
        let black = eval.evaluation_value(Stone::Black);
        assert_eq!(black, -eval.evaluation_value(Stone::White));
        assert!(black > 0);
    }

    #[test]
    fn test_stone_beside_broken_four_keeps_it() {
        // Black XX.XX on row 7, columns 3 to 7
        let mut eval = eval_with(&[(7, 3), (0, 0), (7, 4), (0, 14), (7, 6), (14, 0), (7, 7), (14, 14)]);
        assert_eq!(eval.distribution().black.get(Pattern::Four), 1);
        let idx = BoardConfig::default().index(Pos::new(7, 1));
        assert!(eval.cell_gain(idx, Stone::Black) >= 0);

        eval.apply_move(Pos::new(7, 1)).unwrap();
        assert_eq!(eval.distribution().black.get(Pattern::Four), 1);
        assert_eq!(eval.distribution().black.get(Pattern::OpenThree), 0);
    }

    #[test]
    fn test_cramped_three_earns_no_three_bonus() {
        // Black (7,6),(7,7),(7,8) squeezed by White at (7,4) and (7,10);
        // column 8 holds a real open three
        let eval = eval_with(&[
            (7, 6),
            (7, 4),
            (7, 7),
            (7, 10),
            (6, 8),
            (0, 0),
            (5, 8),
            (0, 14),
        ]);
        let idx = BoardConfig::default().index(Pos::new(7, 8));
        assert!(eval.cell_gain(idx, Stone::Black) < PatternScore::DOUBLE_THREE);
    }

    #[test]
    fn test_double_three_bonus() {
        // Black (7,6),(7,7) and (6,8),(5,8): (7,8) makes two open threes
        let eval = eval_with(&[(7, 6), (0, 0), (7, 7), (0, 14), (6, 8), (14, 0), (5, 8), (14, 14)]);
        let idx = BoardConfig::default().index(Pos::new(7, 8));
        assert!(eval.cell_gain(idx, Stone::Black) >= PatternScore::DOUBLE_THREE);
    }
}
