//! Pattern catalog and line classification
//!
//! A line (row, column or diagonal) is split into segments between opponent
//! stones and the board edge. Segments too short to ever hold a winning run
//! are dead and contribute nothing. Inside a live segment, own stones are
//! grouped into runs that may contain one single-cell gap, and each group is
//! classified by its stone count, whether it has a gap, and how many of its
//! ends touch an empty cell. Threes and twos only count as open when the
//! segment leaves room for an open four.

use std::ops::{AddAssign, SubAssign};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::board::Stone;

/// Line patterns, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `win_length` or more in a row
    Five,
    /// _OOOO_ : two ways to complete
    OpenFour,
    /// One way to complete (XOOOO_, OO_OO, ...)
    Four,
    /// _OOO_ or _O_OO_
    OpenThree,
    ClosedThree,
    OpenTwo,
    ClosedTwo,
}

impl Pattern {
    pub const COUNT: usize = 7;

    pub const ALL: [Pattern; Pattern::COUNT] = [
        Pattern::Five,
        Pattern::OpenFour,
        Pattern::Four,
        Pattern::OpenThree,
        Pattern::ClosedThree,
        Pattern::OpenTwo,
        Pattern::ClosedTwo,
    ];

    #[inline]
    pub fn weight(self) -> i64 {
        match self {
            Pattern::Five => PatternScore::FIVE,
            Pattern::OpenFour => PatternScore::OPEN_FOUR,
            Pattern::Four => PatternScore::FOUR,
            Pattern::OpenThree => PatternScore::OPEN_THREE,
            Pattern::ClosedThree => PatternScore::CLOSED_THREE,
            Pattern::OpenTwo => PatternScore::OPEN_TWO,
            Pattern::ClosedTwo => PatternScore::CLOSED_TWO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Five => "five",
            Pattern::OpenFour => "open_four",
            Pattern::Four => "four",
            Pattern::OpenThree => "open_three",
            Pattern::ClosedThree => "closed_three",
            Pattern::OpenTwo => "open_two",
            Pattern::ClosedTwo => "closed_two",
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Pattern scores for evaluation
///
/// Each tier is separated far enough that `FIVE` outweighs any number of open
/// fours, and `OPEN_FOUR` outweighs any number of weaker patterns, that fit on
/// a 19x19 board (see [`max_pattern_occurrences`]).
pub struct PatternScore;

impl PatternScore {
    pub const FIVE: i64 = 1_000_000_000;
    pub const OPEN_FOUR: i64 = 1_000_000;
    pub const FOUR: i64 = 1_000;
    pub const OPEN_THREE: i64 = 800;
    pub const CLOSED_THREE: i64 = 100;
    pub const OPEN_TWO: i64 = 80;
    pub const CLOSED_TWO: i64 = 10;

    // Multi-line combinations made by a single stone.
    // Two fours, or a four plus an open three, cannot both be answered.
    /// Two fours created at once
    pub const DOUBLE_FOUR: i64 = Self::OPEN_FOUR;
    /// A four plus an open three created at once
    pub const FOUR_THREE: i64 = Self::OPEN_FOUR;
    /// Two open threes created at once
    pub const DOUBLE_THREE: i64 = Self::OPEN_FOUR / 4;
}

/// Upper bound on pattern occurrences on a `width` x `height` board.
///
/// Every counted run holds at least two stones and is followed by at least
/// one empty cell, so a line of length `n` holds at most `(n + 1) / 3` runs.
pub fn max_pattern_occurrences(width: u8, height: u8) -> i64 {
    let (w, h) = (i64::from(width), i64::from(height));
    let per_line = |len: i64| (len + 1) / 3;
    let rows = h * per_line(w);
    let cols = w * per_line(h);
    // Each diagonal direction has w + h - 1 lines
    let diag: i64 = (0..w + h - 1)
        .map(|k| per_line((k + 1).min(w).min(h).min(w + h - 1 - k)))
        .sum();
    rows + cols + 2 * diag
}

/// Per-pattern counts for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PatternCounts([u32; Pattern::COUNT]);

impl PatternCounts {
    #[inline]
    pub fn get(&self, pattern: Pattern) -> u32 {
        self.0[pattern.slot()]
    }

    #[inline]
    pub fn add(&mut self, pattern: Pattern) {
        self.0[pattern.slot()] += 1;
    }

    /// Weighted sum over the catalog
    pub fn score(&self) -> i64 {
        Pattern::ALL
            .iter()
            .map(|&p| i64::from(self.get(p)) * p.weight())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// Fours of either kind
    #[inline]
    pub fn fours(&self) -> u32 {
        self.get(Pattern::OpenFour) + self.get(Pattern::Four)
    }
}

impl AddAssign for PatternCounts {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl SubAssign for PatternCounts {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            debug_assert!(*a >= b, "pattern count underflow");
            *a -= b;
        }
    }
}

impl Serialize for PatternCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Pattern::COUNT))?;
        for p in Pattern::ALL {
            map.serialize_entry(p.name(), &self.get(p))?;
        }
        map.end()
    }
}

/// Classify the runs of `color` on one line.
///
/// `line` lists the cells of the line in order. `win_length` is the run
/// length that wins.
pub fn classify_line(line: &[Stone], color: Stone, win_length: usize) -> PatternCounts {
    let mut counts = PatternCounts::default();
    let opponent = color.opponent();

    for segment in line.split(|&s| s == opponent) {
        if segment.len() < win_length {
            continue;
        }
        classify_segment(segment, color, win_length, &mut counts);
    }
    counts
}

fn run_from(seg: &[Stone], start: usize, color: Stone) -> usize {
    seg[start..].iter().take_while(|&&s| s == color).count()
}

/// Patterns of one way of grouping the runs seen so far
#[derive(Debug, Clone, Copy, Default)]
struct Grouping {
    score: i64,
    counts: PatternCounts,
}

impl Grouping {
    fn with(mut self, pattern: Option<Pattern>) -> Self {
        if let Some(p) = pattern {
            self.score += p.weight();
            self.counts.add(p);
        }
        self
    }
}

/// Group the runs of a live segment and count their patterns.
///
/// Each run stands alone or pairs with a neighbour one empty cell away.
/// Among all such groupings the highest scoring one is kept, so a stone next
/// to a broken four cannot split it.
fn classify_segment(seg: &[Stone], color: Stone, w: usize, counts: &mut PatternCounts) {
    let len = seg.len();
    // Best grouping up to the last run, and up to the run before it
    let mut best = Grouping::default();
    let mut before = Grouping::default();
    let mut last: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < len {
        if seg[i] != color {
            i += 1;
            continue;
        }
        let run = run_from(seg, i, color);
        let end = i + run;

        let alone = best.with(classify_group(seg, i, end, run, false, w));
        let paired = last
            .filter(|&(start, prev)| start + prev + 1 == i && prev + 1 < w && run + 1 < w)
            .map(|(start, prev)| before.with(classify_group(seg, start, end, prev + run, true, w)));

        before = best;
        best = match paired {
            Some(p) if p.score > alone.score => p,
            _ => alone,
        };
        last = Some((i, run));
        i = end;
    }
    *counts += best.counts;
}

/// Classify the stones in `seg[start..end]`.
///
/// The group is open when both neighbours are empty and the segment is long
/// enough to grow it into an open four.
fn classify_group(
    seg: &[Stone],
    start: usize,
    end: usize,
    count: usize,
    gap: bool,
    w: usize,
) -> Option<Pattern> {
    let open_ends = usize::from(start > 0) + usize::from(end < seg.len());
    let room = seg.len() > w;
    classify_run(count, gap, open_ends, room, w)
}

fn classify_run(count: usize, gap: bool, open_ends: usize, room: bool, w: usize) -> Option<Pattern> {
    if !gap && count >= w {
        return Some(Pattern::Five);
    }
    if count + 1 >= w {
        // Filling the gap or an open end completes the line
        return if !gap && open_ends == 2 {
            Some(Pattern::OpenFour)
        } else if gap || open_ends > 0 {
            Some(Pattern::Four)
        } else {
            None
        };
    }
    if open_ends == 0 {
        return None;
    }
    let open = open_ends == 2 && room;
    if count + 2 == w {
        return Some(if open {
            Pattern::OpenThree
        } else {
            Pattern::ClosedThree
        });
    }
    if count + 3 == w && count >= 2 {
        return Some(if open {
            Pattern::OpenTwo
        } else {
            Pattern::ClosedTwo
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse `X` (black), `O` (white) and `.` (empty)
    fn line(s: &str) -> Vec<Stone> {
        s.chars()
            .map(|c| match c {
                'X' => Stone::Black,
                'O' => Stone::White,
                _ => Stone::Empty,
            })
            .collect()
    }

    fn only(s: &str, pattern: Pattern) {
        let counts = classify_line(&line(s), Stone::Black, 5);
        assert_eq!(counts.get(pattern), 1, "{s}: expected one {pattern:?}, got {counts:?}");
        let total: u32 = Pattern::ALL.iter().map(|&p| counts.get(p)).sum();
        assert_eq!(total, 1, "{s}: expected exactly one pattern, got {counts:?}");
    }

    #[test]
    fn test_pattern_score_hierarchy() {
        let weights: Vec<i64> = Pattern::ALL.iter().map(|p| p.weight()).collect();
        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_forced_win_tiers_dominate() {
        let max = max_pattern_occurrences(19, 19);
        assert!(max > 0);
        assert!(max * PatternScore::FOUR < PatternScore::OPEN_FOUR);
        assert!(max * PatternScore::OPEN_FOUR < PatternScore::FIVE);
    }

    #[test]
    fn test_fives() {
        only("..XXXXX..", Pattern::Five);
        only("XXXXXX", Pattern::Five);
        only("OXXXXXO", Pattern::Five);
    }

    #[test]
    fn test_fours() {
        only("..XXXX..", Pattern::OpenFour);
        only("OXXXX...", Pattern::Four);
        only("XXXX.", Pattern::Four);
        only("..XX.XX..", Pattern::Four);
        only("OX.XXXO", Pattern::Four);
        // A stone one gap away must not break up the four
        only(".X.XX.XX..", Pattern::Four);
        only("X.XX.XX..", Pattern::Four);
        only("..XX.XX.X.", Pattern::Four);
    }

    #[test]
    fn test_extra_stone_never_lowers_line_score() {
        let before = classify_line(&line("..XX.XX.."), Stone::Black, 5).score();
        let after = classify_line(&line(".X.XX.XX.."), Stone::Black, 5).score();
        assert!(after >= before, "{after} < {before}");
    }

    #[test]
    fn test_threes() {
        only("..XXX..", Pattern::OpenThree);
        only("..X.XX..", Pattern::OpenThree);
        only("OXXX...", Pattern::ClosedThree);
        // No room for an open four between the white stones
        only("O.XXX.O", Pattern::ClosedThree);
        only("O.X.XX.O", Pattern::OpenThree);
        only("O.XXX..O", Pattern::OpenThree);
    }

    #[test]
    fn test_twos() {
        only("...XX...", Pattern::OpenTwo);
        only("..X.X...", Pattern::OpenTwo);
        only("OXX....", Pattern::ClosedTwo);
        only("O.XX..O", Pattern::ClosedTwo);
    }

    #[test]
    fn test_dead_segment_ignored() {
        let counts = classify_line(&line("OXXXXO...."), Stone::Black, 5);
        assert!(counts.is_empty());
        let counts = classify_line(&line("OXX.O"), Stone::Black, 5);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_single_stones_ignored() {
        let counts = classify_line(&line("X..X..X"), Stone::Black, 5);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_two_groups_on_one_line() {
        let counts = classify_line(&line("..XXX...XX...."), Stone::Black, 5);
        assert_eq!(counts.get(Pattern::OpenThree), 1);
        assert_eq!(counts.get(Pattern::OpenTwo), 1);
    }

    #[test]
    fn test_other_color() {
        let counts = classify_line(&line("..OOO..XX"), Stone::White, 5);
        assert_eq!(counts.get(Pattern::OpenThree), 1);
        assert_eq!(counts.score(), PatternScore::OPEN_THREE);
    }

    #[test]
    fn test_short_win_length() {
        let counts = classify_line(&line(".XX.."), Stone::Black, 3);
        assert_eq!(counts.get(Pattern::OpenFour), 1);
    }

    #[test]
    fn test_serialize_as_map() {
        let mut counts = PatternCounts::default();
        counts.add(Pattern::OpenThree);
        let value = serde_json::to_value(counts).unwrap();
        assert_eq!(value["open_three"], 1);
        assert_eq!(value["five"], 0);
    }
}
