//! Similarity Metrics
//!
//! Measures used by the declaration matcher (names, signatures, member sets)
//! and by the body mapper (token sequences):
//! - Jaccard similarity (set-based)
//! - Edit distance (characters or tokens)
//! - LCS alignment and Dice coefficient over sequences

use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

/// |A ∩ B| / |A ∪ B|; two empty sets count as identical
pub fn jaccard_similarity<T>(set_a: &FxHashSet<T>, set_b: &FxHashSet<T>) -> f64
where
    T: Eq + Hash,
{
    let shared = set_a.intersection(set_b).count();
    match set_a.len() + set_b.len() - shared {
        0 => 1.0,
        union => shared as f64 / union as f64,
    }
}

/// Overlap relative to the larger set: |A ∩ B| / max(|A|, |B|)
pub fn max_overlap<T>(set_a: &FxHashSet<T>, set_b: &FxHashSet<T>) -> f64
where
    T: Eq + Hash,
{
    let max_size = set_a.len().max(set_b.len());
    if max_size == 0 {
        return 0.0;
    }
    set_a.intersection(set_b).count() as f64 / max_size as f64
}

/// Unit-cost edit distance between two sequences, one rolling row
pub fn edit_distance<T: PartialEq>(seq_a: &[T], seq_b: &[T]) -> usize {
    if seq_a.is_empty() || seq_b.is_empty() {
        return seq_a.len().max(seq_b.len());
    }
    let mut row: Vec<usize> = (0..=seq_b.len()).collect();
    for (i, a) in seq_a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b) in seq_b.iter().enumerate() {
            let substitute = diagonal + usize::from(a != b);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[seq_b.len()]
}

/// Character-level Levenshtein distance
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    edit_distance(&a, &b)
}

/// 1.0 minus the distance over the longer length
pub fn normalized_levenshtein_similarity(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(&a, &b) as f64 / longest as f64
}

/// One step of a sequence alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// `before[i] == after[j]`
    Keep(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Longest-common-subsequence alignment
///
/// Ties prefer deletions before insertions so replaced runs come out as a
/// delete block followed by an insert block.
pub fn lcs_alignment<T: Eq>(seq_a: &[T], seq_b: &[T]) -> Vec<EditOp> {
    let n = seq_a.len();
    let m = seq_b.len();
    // suffix table: table[i][j] = LCS of seq_a[i..] and seq_b[j..]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if seq_a[i] == seq_b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if seq_a[i] == seq_b[j] {
            ops.push(EditOp::Keep(i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(EditOp::Delete(i));
            i += 1;
        } else {
            ops.push(EditOp::Insert(j));
            j += 1;
        }
    }
    ops.extend((i..n).map(EditOp::Delete));
    ops.extend((j..m).map(EditOp::Insert));
    ops
}

/// Dice coefficient over sequences: 2 * common / (|A| + |B|)
pub fn dice_from_common(common: usize, len_a: usize, len_b: usize) -> f64 {
    if len_a + len_b == 0 {
        return 1.0;
    }
    2.0 * common as f64 / (len_a + len_b) as f64
}

/// Dice coefficient over token multisets (order-insensitive, linear time)
pub fn multiset_dice<T>(seq_a: &[T], seq_b: &[T]) -> f64
where
    T: Eq + Hash,
{
    let mut counts: FxHashMap<&T, i64> = FxHashMap::default();
    for t in seq_a {
        *counts.entry(t).or_insert(0) += 1;
    }
    let mut common = 0;
    for t in seq_b {
        if let Some(c) = counts.get_mut(t) {
            if *c > 0 {
                *c -= 1;
                common += 1;
            }
        }
    }
    dice_from_common(common, seq_a.len(), seq_b.len())
}
