//! Extract / inline duality and nested chains through the full pipeline

#[path = "../common/mod.rs"]
mod common;

use common::*;
use refminer_core::config::MinerConfig;
use refminer_core::features::model_diff::RenameHints;
use refminer_core::shared::models::builders::{call, expr_stmt, var};
use refminer_core::shared::models::Model;
use refminer_core::{
    CancellationToken, MiningResult, Refactoring, RefactoringDetectionUseCase, RefactoringKind,
    RefactoringMiner,
};

fn detect(before: &Model, after: &Model) -> MiningResult {
    RefactoringMiner::new(MinerConfig::default())
        .detect(before, after, &RenameHints::new(), &CancellationToken::new())
        .unwrap()
}

/// Before: `run(job)` with `n` steps. After: the last `tail` steps moved into
/// `finish(job)`, called at the end of `run`.
fn tail_extraction(n: usize, tail: usize) -> (Model, Model) {
    let params = [("Job", "job")];
    let before = model_of("a.Worker", vec![op_with_params("run", &params, fixture_steps(0..n, "job"))]);
    let mut caller = fixture_steps(0..n - tail, "job");
    caller.push(expr_stmt(call("finish", vec![var("job")])));
    let after = model_of(
        "a.Worker",
        vec![
            op_with_params("run", &params, caller),
            op_with_params("finish", &params, fixture_steps(n - tail..n, "job")),
        ],
    );
    (before, after)
}

#[test]
fn test_tail_extraction_is_one_extract() {
    for (n, tail) in [(3, 2), (5, 3), (6, 2), (8, 5)] {
        let (before, after) = tail_extraction(n, tail);
        let result = detect(&before, &after);
        assert_kinds(&result, &[RefactoringKind::ExtractOperation]);

        let Refactoring::ExtractOperation {
            source_before,
            extracted,
            mapper,
            ..
        } = &result.refactorings[0]
        else {
            panic!("expected extract for n={n} tail={tail}");
        };
        assert_eq!(before.operation(*source_before).name, "run");
        assert_eq!(after.operation(*extracted).name, "finish");
        let mapping = result.diff.mapping(*mapper).unwrap();
        assert!(mapping.after_coverage() >= 0.9, "n={n} tail={tail}");
        assert_bijective(mapping);
    }
}

#[test]
fn test_reverse_of_extraction_is_inline() {
    for (n, tail) in [(3, 2), (5, 3)] {
        let (extracted, inlined) = tail_extraction(n, tail);
        // swap the snapshots: `finish` disappears and its body returns to `run`
        let result = detect(&inlined, &extracted);
        assert_kinds(&result, &[RefactoringKind::InlineOperation]);

        let Refactoring::InlineOperation { inlined: gone, mapper, .. } = &result.refactorings[0] else {
            panic!("expected inline");
        };
        assert_eq!(inlined.operation(*gone).name, "finish");
        assert_eq!(result.diff.mapping(*mapper).unwrap().coverage(), 1.0);
    }
}

#[test]
fn test_nested_extraction_keeps_parent_chain() {
    let params = [("Page", "page")];
    let before = model_of("a.Report", vec![op_with_params("render", &params, fixture_steps(0..4, "page"))]);
    let mut top = fixture_steps(0..2, "page");
    top.push(expr_stmt(call("renderBody", vec![var("page")])));
    let after = model_of(
        "a.Report",
        vec![
            op_with_params("render", &params, vec![expr_stmt(call("renderTop", vec![var("page")]))]),
            op_with_params("renderTop", &params, top),
            op_with_params("renderBody", &params, fixture_steps(2..4, "page")),
        ],
    );

    let result = detect(&before, &after);
    assert_kinds(
        &result,
        &[RefactoringKind::ExtractOperation, RefactoringKind::ExtractOperation],
    );
    let depths: Vec<usize> = result
        .refactorings
        .iter()
        .flat_map(|r| r.cited_mappers())
        .map(|id| result.diff.mappers.depth(id))
        .collect();
    let mut sorted = depths.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2]);
}

#[test]
fn test_extracted_operation_that_already_existed_is_not_reported() {
    let params = [("Job", "job")];
    let helper = || op_with_params("finish", &params, fixture_steps(10..12, "job"));
    let before = model_of(
        "a.Worker",
        vec![op_with_params("run", &params, fixture_steps(0..3, "job")), helper()],
    );
    let mut caller = fixture_steps(0..3, "job");
    caller.push(expr_stmt(call("finish", vec![var("job")])));
    let after = model_of("a.Worker", vec![op_with_params("run", &params, caller), helper()]);

    let result = detect(&before, &after);
    assert_none_of(
        &result,
        &[RefactoringKind::ExtractOperation, RefactoringKind::InlineOperation],
    );
}
