//! Evaluation module for Gomoku positions
//!
//! This module provides pattern recognition and scoring for board positions.
//! The evaluation considers:
//! - Line patterns (fives, fours, threes, twos), kept incrementally per line
//! - Multi-line combinations (double four, four-three, double three)
//! - Positional prior (center control)

pub mod evaluator;
pub mod heuristic;
pub mod patterns;

pub use evaluator::{PatternDistribution, PatternEvaluator};
pub use patterns::{classify_line, max_pattern_occurrences, Pattern, PatternCounts, PatternScore};
