//! Line-based content similarity used for rename detection
//!
//! Similarity is `2 * LCS / (|a| + |b|)`: 1.0 for identical files, 0.0 for
//! files sharing no line.

use crate::artifacts::diff::myers::{DiffAlgorithm, MyersDiff};

pub fn similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let common = MyersDiff::new(a, b).lcs_len();
    (2 * common) as f64 / (a.len() + b.len()) as f64
}

/// Best similarity two files of these lengths could reach
pub fn similarity_bound(a_len: usize, b_len: usize) -> f64 {
    if a_len + b_len == 0 {
        return 1.0;
    }

    (2 * a_len.min(b_len)) as f64 / (a_len + b_len) as f64
}
