//! End-to-end scenarios over hand-built models

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pretty_assertions::assert_eq;
use refminer_core::config::{MapperConfig, MinerConfig};
use refminer_core::features::body_mapper::BodyMapper;
use refminer_core::features::model_diff::RenameHints;
use refminer_core::features::replacement::{Replacement, ReplacementKind};
use refminer_core::shared::models::builders::{call, declare, expr_stmt, infix, lit, method_call, ret, var};
use refminer_core::shared::models::Expression;
use refminer_core::shared::models::{OperationRef, TypeRef};
use refminer_core::{
    CancellationToken, Refactoring, RefactoringDetectionUseCase, RefactoringKind, RefactoringMiner,
};

fn miner() -> RefactoringMiner {
    RefactoringMiner::new(MinerConfig::default())
}

#[test]
fn test_renamed_local_maps_every_statement() {
    let before = op("m", vec![declare("int", "x", lit("1")), expr_stmt(call("foo", vec![var("x")]))]);
    let after = op("m", vec![declare("int", "y", lit("1")), expr_stmt(call("foo", vec![var("y")]))]);
    let r = OperationRef::new(TypeRef(0), 0);

    let mapping = BodyMapper::new(MapperConfig::default()).map_operations(r, &before, r, &after);
    assert_eq!(mapping.edges.len(), 2);
    for edge in &mapping.edges {
        assert_eq!(
            edge.replacements,
            vec![Replacement::new(ReplacementKind::VariableRenamed, "x", "y")]
        );
    }
    assert!(mapping.unmatched_before.is_empty());
    assert!(mapping.unmatched_after.is_empty());
    assert_bijective(&mapping);
}

#[test]
fn test_renamed_local_reported_as_rename_variable() {
    let before = model_of(
        "a.Calc",
        vec![op("m", vec![declare("int", "x", lit("1")), expr_stmt(call("foo", vec![var("x")]))])],
    );
    let after = model_of(
        "a.Calc",
        vec![op("m", vec![declare("int", "y", lit("1")), expr_stmt(call("foo", vec![var("y")]))])],
    );
    let result = miner()
        .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
        .unwrap();
    assert_kinds(&result, &[RefactoringKind::RenameVariable]);
    assert_eq!(
        result.reports[0].description,
        "Rename Variable x to y in method m() : void from class a.Calc"
    );
}

#[test]
fn test_head_of_body_extracted_into_new_operation() {
    let before = model_of("a.Orders", vec![op_with_params("ship", &[("Order", "order")], fixture_steps(0..5, "order"))]);
    let mut caller = vec![expr_stmt(call("prepare", vec![var("order")]))];
    caller.extend(fixture_steps(3..5, "order"));
    let after = model_of(
        "a.Orders",
        vec![
            op_with_params("ship", &[("Order", "order")], caller),
            op_with_params("prepare", &[("Order", "order")], fixture_steps(0..3, "order")),
        ],
    );

    let result = miner()
        .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
        .unwrap();
    assert_kinds(&result, &[RefactoringKind::ExtractOperation]);

    let Refactoring::ExtractOperation { extracted, mapper, .. } = &result.refactorings[0] else {
        panic!("expected extract");
    };
    assert_eq!(after.operation(*extracted).name, "prepare");
    let extraction = result.diff.mapping(*mapper).unwrap();
    assert_eq!(extraction.mapped_count(), 3);
    assert_bijective(extraction);

    let ship = result.diff.match_for_before(OperationRef::new(TypeRef(0), 0)).unwrap();
    let direct = result.diff.mapping(ship.mapper.unwrap()).unwrap();
    assert_eq!(direct.edges.len(), 2);
    assert!(direct.edges.iter().all(|e| e.is_exact()));
    assert_eq!(direct.unmatched_after, vec![0]);
}

#[test]
fn test_report_carries_ranges_and_elements() {
    let before = model_of("a.Orders", vec![op_with_params("ship", &[("Order", "order")], fixture_steps(0..5, "order"))]);
    let mut caller = vec![expr_stmt(call("prepare", vec![var("order")]))];
    caller.extend(fixture_steps(3..5, "order"));
    let after = model_of(
        "a.Orders",
        vec![
            op_with_params("ship", &[("Order", "order")], caller),
            op_with_params("prepare", &[("Order", "order")], fixture_steps(0..3, "order")),
        ],
    );
    let result = miner()
        .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
        .unwrap();
    let report = &result.reports[0];
    assert_eq!(report.name, "Extract Method");
    assert_eq!(report.before_elements[0].qualified_name, "a.Orders.ship");
    assert_eq!(report.after_elements[0].signature, "prepare(Order) : void");
    assert_eq!(report.after_ranges[0].file_path, "src/a/Orders.java");
    assert_eq!(
        report.description,
        "Extract Method prepare(Order) : void extracted from ship(Order) : void in class a.Orders"
    );
}

fn order_total() -> Expression {
    infix(method_call(var("order"), "total", vec![]), "*", var("rate"))
}

#[test]
fn test_argument_extracted_into_local() {
    let before = model_of(
        "a.Billing",
        vec![op("charge", vec![expr_stmt(call("process", vec![order_total()])), ret(lit("true"))])],
    );
    let after = model_of(
        "a.Billing",
        vec![op(
            "charge",
            vec![
                declare("double", "due", order_total()),
                expr_stmt(call("process", vec![var("due")])),
                ret(lit("true")),
            ],
        )],
    );
    let result = miner()
        .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
        .unwrap();
    assert_kinds(&result, &[RefactoringKind::ExtractVariable]);
    assert_eq!(
        result.reports[0].description,
        "Extract Variable due : double in method charge() : void from class a.Billing"
    );
}

#[test]
fn test_local_inlined_into_return() {
    let before = model_of(
        "a.Billing",
        vec![op("charge", vec![declare("double", "due", order_total()), ret(var("due"))])],
    );
    let after = model_of("a.Billing", vec![op("charge", vec![ret(order_total())])]);
    let result = miner()
        .detect(&before, &after, &RenameHints::new(), &CancellationToken::new())
        .unwrap();
    assert_kinds(&result, &[RefactoringKind::InlineVariable]);
}
