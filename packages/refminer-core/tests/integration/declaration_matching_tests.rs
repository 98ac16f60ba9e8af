//! Class, operation and attribute level refactorings

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pretty_assertions::assert_eq;
use refminer_core::config::MinerConfig;
use refminer_core::features::model_diff::{RenameHints, TypeMatchKind};
use refminer_core::features::replacement::ReplacementKind;
use refminer_core::shared::models::builders::{call, declare, expr_stmt, lit, ret, var, OperationBuilder, TypeBuilder};
use refminer_core::shared::models::{Annotation, Attribute, Model, Modifier, Operation, TypeKind, Visibility};
use refminer_core::{CancellationToken, MiningResult, RefactoringDetectionUseCase, RefactoringKind, RefactoringMiner};

fn detect(before: &Model, after: &Model) -> MiningResult {
    RefactoringMiner::new(MinerConfig::default())
        .detect(before, after, &RenameHints::new(), &CancellationToken::new())
        .unwrap()
}

fn parse_value(name: &str) -> Operation {
    OperationBuilder::new(name)
        .param("String", "raw")
        .returns("int")
        .body(vec![
            declare("String", "trimmed", call("trim", vec![var("raw")])),
            expr_stmt(call("validate", vec![var("trimmed")])),
            ret(call("parse", vec![var("trimmed")])),
        ])
        .build()
}

#[test]
fn test_moved_class() {
    let class = |name: &str| {
        TypeBuilder::new(name)
            .operation(parse_value("parseValue"))
            .attribute(Attribute::new("int", "count").with_initializer(lit("0")))
            .build()
    };
    let result = detect(&Model::new(vec![class("a.Parser")]), &Model::new(vec![class("b.Parser")]));
    assert_eq!(result.diff.type_matches[0].kind, TypeMatchKind::Moved);
    assert_kinds(&result, &[RefactoringKind::MoveClass]);
    assert_eq!(result.reports[0].description, "Move Class a.Parser moved to b.Parser");
}

#[test]
fn test_pull_up_method() {
    let before = Model::new(vec![
        TypeBuilder::new("a.Shape").operation(OperationBuilder::new("area").build()).build(),
        TypeBuilder::new("a.Circle")
            .superclass("a.Shape")
            .operation(parse_value("parseValue"))
            .build(),
    ]);
    let after = Model::new(vec![
        TypeBuilder::new("a.Shape")
            .operation(OperationBuilder::new("area").build())
            .operation(parse_value("parseValue"))
            .build(),
        TypeBuilder::new("a.Circle").superclass("a.Shape").build(),
    ]);
    let result = detect(&before, &after);
    assert_kinds(&result, &[RefactoringKind::PullUpOperation]);
}

#[test]
fn test_pulled_up_method_into_new_superclass() {
    let before = Model::new(vec![
        TypeBuilder::new("a.Circle").operation(parse_value("parseValue")).build(),
        TypeBuilder::new("a.Label").build(),
    ]);
    let after = Model::new(vec![
        TypeBuilder::new("a.Circle").superclass("a.Figure").build(),
        TypeBuilder::new("a.Label").build(),
        TypeBuilder::new("a.Figure").operation(parse_value("parseValue")).build(),
    ]);
    let result = detect(&before, &after);
    assert_kinds(
        &result,
        &[RefactoringKind::PullUpOperation, RefactoringKind::ExtractSuperclass],
    );
    assert_eq!(
        result.reports[1].description,
        "Extract Superclass a.Figure from classes [a.Circle]"
    );
}

#[test]
fn test_shared_signature_extracted_into_interface() {
    let class = |name: &str, interface: Option<&str>| {
        let builder = TypeBuilder::new(name).operation(parse_value("parseValue"));
        match interface {
            Some(i) => builder.interface(i).build(),
            None => builder.build(),
        }
    };
    let before = Model::new(vec![class("a.Circle", None), class("a.Square", None)]);
    let after = Model::new(vec![
        class("a.Circle", Some("a.Parsing")),
        class("a.Square", Some("a.Parsing")),
        TypeBuilder::new("a.Parsing")
            .kind(TypeKind::Interface)
            .operation(
                OperationBuilder::new("parseValue")
                    .param("String", "raw")
                    .returns("int")
                    .without_body()
                    .build(),
            )
            .build(),
    ]);
    let result = detect(&before, &after);
    assert_kinds(&result, &[RefactoringKind::ExtractInterface]);
    assert_eq!(
        result.reports[0].description,
        "Extract Interface a.Parsing from classes [a.Circle, a.Square]"
    );
}

#[test]
fn test_attribute_moved_and_renamed_with_same_initializer() {
    let before = Model::new(vec![
        TypeBuilder::new("a.Client")
            .attribute(Attribute::new("int", "timeout").with_initializer(lit("30")))
            .operation(parse_value("parseValue"))
            .build(),
        TypeBuilder::new("a.Settings").build(),
    ]);
    let after = Model::new(vec![
        TypeBuilder::new("a.Client").operation(parse_value("parseValue")).build(),
        TypeBuilder::new("a.Settings")
            .attribute(Attribute::new("int", "timeoutSeconds").with_initializer(lit("30")))
            .build(),
    ]);
    let result = detect(&before, &after);
    assert_kinds(&result, &[RefactoringKind::MoveAndRenameAttribute]);
    let description = &result.reports[0].description;
    assert!(description.starts_with("Move And Rename Attribute timeout"), "{description}");
    assert!(description.contains("timeoutSeconds"), "{description}");
    assert!(description.ends_with("from class a.Settings"), "{description}");
}

#[test]
fn test_rename_only_changes_are_renames() {
    let before = model_of("a.Sink", vec![op("process", fixture_mixed_body(9))]);
    let after = model_of("a.Sink", vec![op("handle", fixture_mixed_body_renamed(9))]);
    let result = detect(&before, &after);

    let kinds: Vec<RefactoringKind> = result.reports.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&RefactoringKind::RenameOperation), "{kinds:?}");
    assert_none_of(
        &result,
        &[
            RefactoringKind::ExtractOperation,
            RefactoringKind::InlineOperation,
            RefactoringKind::MergeOperation,
            RefactoringKind::SplitOperation,
            RefactoringKind::MoveCode,
        ],
    );

    let m = &result.diff.operation_matches[0];
    let mapping = result.diff.mapping(m.mapper.unwrap()).unwrap();
    assert_eq!(mapping.coverage(), 1.0);
    assert!(mapping.replacements().all(|r| matches!(
        r.kind,
        ReplacementKind::VariableRenamed | ReplacementKind::InvocationRenamed
    )));
}

#[test]
fn test_rename_only_changes_with_nested_calls() {
    let before = model_of("a.Billing", vec![op("process", fixture_nested_calls("order"))]);
    let after = model_of("a.Billing", vec![op("handle", fixture_nested_calls("current"))]);
    let result = detect(&before, &after);

    let kinds: Vec<RefactoringKind> = result.reports.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&RefactoringKind::RenameOperation), "{kinds:?}");
    let renamed: Vec<&str> = result
        .reports
        .iter()
        .filter(|r| r.kind == RefactoringKind::RenameVariable)
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(renamed.len(), 3, "{renamed:?}");
    assert_none_of(
        &result,
        &[
            RefactoringKind::ExtractOperation,
            RefactoringKind::InlineOperation,
            RefactoringKind::ExtractVariable,
            RefactoringKind::InlineVariable,
            RefactoringKind::ChangeVariableType,
            RefactoringKind::MoveCode,
        ],
    );

    let m = &result.diff.operation_matches[0];
    let mapping = result.diff.mapping(m.mapper.unwrap()).unwrap();
    assert_bijective(mapping);
    assert_eq!(mapping.coverage(), 1.0);
    assert!(mapping
        .replacements()
        .all(|r| r.kind == ReplacementKind::VariableRenamed));
}

#[test]
fn test_rename_local_with_call_initializer() {
    let body = |name: &str| {
        vec![
            declare("int", name, call("compute", vec![var("a")])),
            expr_stmt(call("use", vec![var(name)])),
        ]
    };
    let result = detect(
        &model_of("a.Calc", vec![op("run", body("x"))]),
        &model_of("a.Calc", vec![op("run", body("y"))]),
    );
    assert_kinds(&result, &[RefactoringKind::RenameVariable]);
}

#[test]
fn test_retype_local_with_call_initializer() {
    let body = |type_name: &str| {
        vec![
            declare(type_name, "total", call("compute", vec![var("a")])),
            ret(call("scale", vec![var("total")])),
        ]
    };
    let result = detect(
        &model_of("a.Calc", vec![op("run", body("int"))]),
        &model_of("a.Calc", vec![op("run", body("long"))]),
    );
    assert_kinds(&result, &[RefactoringKind::ChangeVariableType]);
}

#[test]
fn test_signature_changes() {
    let before = model_of(
        "a.Store",
        vec![OperationBuilder::new("save")
            .param("String", "key")
            .param("int", "value")
            .returns("int")
            .throws("IOException")
            .build()],
    );
    let after = model_of(
        "a.Store",
        vec![OperationBuilder::new("save")
            .param("String", "key")
            .param("long", "value")
            .returns("long")
            .visibility(Visibility::Protected)
            .build()],
    );
    let result = detect(&before, &after);
    assert_kinds(
        &result,
        &[
            RefactoringKind::ChangeReturnType,
            RefactoringKind::ChangeParameterType,
            RefactoringKind::RemoveThrownExceptionType,
            RefactoringKind::ChangeOperationAccessModifier,
        ],
    );
}

#[test]
fn test_attribute_type_change() {
    let class = |t: &str| TypeBuilder::new("a.Counter").attribute(Attribute::new(t, "count")).build();
    let result = detect(&Model::new(vec![class("int")]), &Model::new(vec![class("long")]));
    assert_kinds(&result, &[RefactoringKind::ChangeAttributeType]);
    assert_eq!(
        result.reports[0].description,
        "Change Attribute Type count : int to count : long in class a.Counter"
    );
}

#[test]
fn test_attribute_annotation_and_visibility() {
    let before = TypeBuilder::new("a.Config")
        .attribute(Attribute::new("String", "url").with_modifier(Modifier::Final))
        .build();
    let after = TypeBuilder::new("a.Config")
        .attribute(
            Attribute::new("String", "url")
                .with_modifier(Modifier::Final)
                .with_annotation(Annotation::new("Deprecated"))
                .with_visibility(Visibility::Public),
        )
        .build();
    let result = detect(&Model::new(vec![before]), &Model::new(vec![after]));
    assert_kinds(
        &result,
        &[
            RefactoringKind::AddAttributeAnnotation,
            RefactoringKind::ChangeAttributeAccessModifier,
        ],
    );
}

#[test]
fn test_doc_comment_change_is_not_a_refactoring() {
    let class = |doc: &str| {
        TypeBuilder::new("a.Clock")
            .operation(OperationBuilder::new("now").returns("long").doc(doc).build())
            .build()
    };
    let result = detect(
        &Model::new(vec![class("Current time.")]),
        &Model::new(vec![class("Current time in millis.")]),
    );
    assert!(result.is_empty(), "{:?}", result.descriptions());
}
