//! Incremental pattern evaluator
//!
//! Keeps a per-line classification of both players' runs and a board-wide
//! pattern distribution. A move changes at most the four lines through its
//! cell, so apply and undo only reclassify those lines and patch the
//! distribution by the difference.

use serde::Serialize;

use super::patterns::{classify_line, PatternCounts};
use crate::board::{Board, BoardConfig, BoardError, Pos, Stone};
use crate::rules::DIRECTIONS;

/// Board-wide pattern counts for both players
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatternDistribution {
    pub black: PatternCounts,
    pub white: PatternCounts,
}

impl PatternDistribution {
    #[inline]
    pub fn get(&self, player: Stone) -> &PatternCounts {
        match player {
            Stone::White => &self.white,
            _ => &self.black,
        }
    }

    #[inline]
    fn get_mut(&mut self, player: Stone) -> &mut PatternCounts {
        match player {
            Stone::White => &mut self.white,
            _ => &mut self.black,
        }
    }
}

/// Line membership of a cell: (line id, offset within the line)
type LineSlot = (usize, usize);

#[derive(Debug, Clone)]
pub struct PatternEvaluator {
    config: BoardConfig,
    cells: Vec<Stone>,
    /// Cell indices of every line, in walking order
    lines: Vec<Vec<usize>>,
    /// For each cell, its line in each of the four directions
    cell_lines: Vec<[LineSlot; 4]>,
    /// Cached classification per line, indexed by player slot
    line_patterns: Vec<[PatternCounts; 2]>,
    distribution: PatternDistribution,
    history: Vec<Pos>,
}

impl PatternEvaluator {
    pub fn new(config: BoardConfig) -> Self {
        let cells = config.cells();
        let mut lines = Vec::new();
        let mut cell_lines = vec![[(0, 0); 4]; cells];

        for (dir, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
            for idx in 0..cells {
                let pos = config.pos(idx);
                let (r, c) = (i32::from(pos.row), i32::from(pos.col));
                // A line starts where stepping backwards leaves the board
                if config.contains(r - dr, c - dc) {
                    continue;
                }
                let id = lines.len();
                let mut line = Vec::new();
                let (mut r, mut c) = (r, c);
                while config.contains(r, c) {
                    let cell = config.index(Pos::new(r as u8, c as u8));
                    cell_lines[cell][dir] = (id, line.len());
                    line.push(cell);
                    r += dr;
                    c += dc;
                }
                lines.push(line);
            }
        }

        let line_count = lines.len();
        Self {
            config,
            cells: vec![Stone::Empty; cells],
            lines,
            cell_lines,
            line_patterns: vec![[PatternCounts::default(); 2]; line_count],
            distribution: PatternDistribution::default(),
            history: Vec::with_capacity(cells),
        }
    }

    /// Evaluator replaying the board's history
    pub fn from_board(board: &Board) -> Result<Self, BoardError> {
        let mut evaluator = Self::new(*board.config());
        evaluator.sync_with_board(board)?;
        Ok(evaluator)
    }

    #[inline]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[inline]
    pub fn current_player(&self) -> Stone {
        if self.history.len() % 2 == 0 {
            Stone::Black
        } else {
            Stone::White
        }
    }

    #[inline]
    pub fn history(&self) -> &[Pos] {
        &self.history
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.config.in_bounds(pos) {
            self.cells[self.config.index(pos)]
        } else {
            Stone::Empty
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.history.len() == self.cells.len()
    }

    #[inline]
    pub fn distribution(&self) -> &PatternDistribution {
        &self.distribution
    }

    /// `player` already has a winning run on the board
    #[inline]
    pub fn has_five(&self, player: Stone) -> bool {
        self.distribution.get(player).get(super::Pattern::Five) > 0
    }

    /// Place a stone for the player to move.
    pub fn apply_move(&mut self, pos: Pos) -> Result<(), BoardError> {
        if !self.config.in_bounds(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        let idx = self.config.index(pos);
        if self.cells[idx] != Stone::Empty {
            return Err(BoardError::Occupied(pos));
        }
        self.cells[idx] = self.current_player();
        self.history.push(pos);
        self.refresh_lines(idx);
        Ok(())
    }

    /// Retract the most recent move.
    pub fn undo_move(&mut self) -> Result<Pos, BoardError> {
        let pos = self.history.pop().ok_or(BoardError::NothingToUndo)?;
        let idx = self.config.index(pos);
        self.cells[idx] = Stone::Empty;
        self.refresh_lines(idx);
        Ok(pos)
    }

    /// Back to the empty board
    pub fn reset(&mut self) {
        self.cells.fill(Stone::Empty);
        self.line_patterns.fill([PatternCounts::default(); 2]);
        self.distribution = PatternDistribution::default();
        self.history.clear();
    }

    /// Align with a board that may have moved on (or back) since the last sync.
    ///
    /// Moves past the common history prefix are undone, then the board's
    /// remaining moves are applied in order.
    pub fn sync_with_board(&mut self, board: &Board) -> Result<(), BoardError> {
        if *board.config() != self.config {
            *self = Self::new(*board.config());
        }
        let target = board.history();
        let common = self
            .history
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();
        while self.history.len() > common {
            self.undo_move()?;
        }
        for &pos in &target[common..] {
            self.apply_move(pos)?;
        }
        Ok(())
    }

    /// Distribution recomputed from scratch over every line
    pub fn rescan(&self) -> PatternDistribution {
        let mut dist = PatternDistribution::default();
        for id in 0..self.lines.len() {
            let [black, white] = self.classify(id, None);
            dist.black += black;
            dist.white += white;
        }
        dist
    }

    /// Classify one line for both players, optionally with one cell overridden.
    ///
    /// The line is copied into a stack buffer. Board sides are `u8`, so no
    /// line is longer than `u8::MAX` cells.
    pub(super) fn classify(&self, id: usize, overlay: Option<(usize, Stone)>) -> [PatternCounts; 2] {
        let line = &self.lines[id];
        let mut buf = [Stone::Empty; u8::MAX as usize];
        for (slot, &cell) in buf.iter_mut().zip(line) {
            *slot = self.cells[cell];
        }
        if let Some((offset, stone)) = overlay {
            buf[offset] = stone;
        }
        let stones = &buf[..line.len()];
        let w = usize::from(self.config.win_length);
        [
            classify_line(stones, Stone::Black, w),
            classify_line(stones, Stone::White, w),
        ]
    }

    /// Cell indices of a line, in walking order
    #[inline]
    pub(super) fn line(&self, id: usize) -> &[usize] {
        &self.lines[id]
    }

    #[inline]
    pub(super) fn cell_lines(&self, idx: usize) -> &[LineSlot; 4] {
        &self.cell_lines[idx]
    }

    #[inline]
    pub(super) fn line_patterns(&self, id: usize) -> &[PatternCounts; 2] {
        &self.line_patterns[id]
    }

    #[inline]
    pub(super) fn cells(&self) -> &[Stone] {
        &self.cells
    }

    fn refresh_lines(&mut self, idx: usize) {
        for (id, _) in self.cell_lines[idx] {
            let fresh = self.classify(id, None);
            for player in [Stone::Black, Stone::White] {
                let slot = player.slot();
                let counts = self.distribution.get_mut(player);
                *counts -= self.line_patterns[id][slot];
                *counts += fresh[slot];
            }
            self.line_patterns[id] = fresh;
        }
    }
}
