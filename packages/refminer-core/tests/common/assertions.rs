//! Custom assertions for refactoring results

use refminer_core::features::body_mapper::BodyMapping;
use refminer_core::{MiningResult, RefactoringKind};

/// Assert the result holds exactly these kinds, in report order
pub fn assert_kinds(result: &MiningResult, expected: &[RefactoringKind]) {
    let kinds: Vec<RefactoringKind> = result.reports.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        expected,
        "Unexpected refactorings: {:#?}",
        result.descriptions()
    );
}

/// Assert no kind in `forbidden` was reported
pub fn assert_none_of(result: &MiningResult, forbidden: &[RefactoringKind]) {
    let hits: Vec<&str> = result
        .reports
        .iter()
        .filter(|r| forbidden.contains(&r.kind))
        .map(|r| r.description.as_str())
        .collect();
    assert!(hits.is_empty(), "Unexpected refactorings: {hits:?}");
}

/// Assert no fragment appears in two edges on either side
pub fn assert_bijective(mapping: &BodyMapping) {
    assert!(
        mapping.is_bijective(),
        "Mapping {:?} -> {:?} is not one-to-one: {:#?}",
        mapping.before,
        mapping.after,
        mapping.edges
    );
}
