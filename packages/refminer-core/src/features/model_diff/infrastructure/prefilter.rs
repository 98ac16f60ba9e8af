//! Cheap pre-filters run before any speculative body mapping

use crate::features::replacement::infrastructure::similarity::{
    levenshtein_distance, max_overlap, multiset_dice, normalized_levenshtein_similarity,
};
use crate::shared::models::{Operation, TypeDeclaration};
use rustc_hash::FxHashSet;

/// log2 bucket of a statement count (0 for empty bodies)
pub fn statement_bucket(count: usize) -> u32 {
    usize::BITS - count.leading_zeros()
}

pub fn buckets_compatible(before: usize, after: usize, tolerance: u32) -> bool {
    statement_bucket(before).abs_diff(statement_bucket(after)) <= tolerance
}

pub fn name_similarity(before: &str, after: &str) -> f64 {
    normalized_levenshtein_similarity(before, after)
}

/// Dice overlap of parameter type lists, 1.0 when both are empty
pub fn parameter_similarity(before: &Operation, after: &Operation) -> f64 {
    multiset_dice(&before.parameter_types(), &after.parameter_types())
}

pub fn signature_distance(before: &Operation, after: &Operation) -> usize {
    levenshtein_distance(&before.signature(), &after.signature())
}

/// Operation signature keys plus attribute names
pub fn member_keys(decl: &TypeDeclaration) -> FxHashSet<String> {
    decl.operations
        .iter()
        .map(|op| op.signature_key())
        .chain(decl.attributes.iter().map(|a| format!("field:{}", a.name)))
        .collect()
}

/// Member overlap of two types; member-less types only pair by simple name
pub fn member_similarity(before: &TypeDeclaration, after: &TypeDeclaration) -> f64 {
    let b = member_keys(before);
    let a = member_keys(after);
    if b.is_empty() && a.is_empty() {
        return if before.simple_name() == after.simple_name() {
            1.0
        } else {
            0.0
        };
    }
    max_overlap(&b, &a)
}
