//! Source snapshots, configuration loading and run-level guarantees

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use refminer_core::config::MinerConfig;
use refminer_core::features::body_mapper::BodyMapper;
use refminer_core::features::model_diff::RenameHints;
use refminer_core::shared::models::builders::{
    call, expr_stmt, if_else, if_then, raw, var, while_loop, OperationBuilder, TypeBuilder,
};
use refminer_core::shared::models::{Model, OperationRef, Statement, TypeDeclaration, TypeRef};
use refminer_core::{
    CancellationToken, FrontEnd, FrontEndError, MiningResult, RefactoringDetectionUseCase, RefactoringKind,
    RefactoringMiner, SkippedFile, SourceSnapshot,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Line-oriented stand-in for a language front end:
/// `class <qualified name>` opens a type, `op <name> <return type>` adds an operation
struct LineFrontEnd;

impl FrontEnd for LineFrontEnd {
    fn parse(&self, path: &str, source: &str) -> Result<Vec<TypeDeclaration>, FrontEndError> {
        let mut types: Vec<TypeBuilder> = Vec::new();
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                ["class", name] => types.push(TypeBuilder::new(name).file(path)),
                ["op", name, ret] if !types.is_empty() => {
                    let op = OperationBuilder::new(name).returns(ret).build();
                    if let Some(current) = types.pop() {
                        types.push(current.operation(op));
                    }
                }
                ["op", ..] => return Err(FrontEndError::malformed(path, "operation outside a class")),
                _ => return Err(FrontEndError::parse(path, format!("unexpected line '{}'", line))),
            }
        }
        Ok(types.into_iter().map(TypeBuilder::build).collect())
    }
}

fn miner() -> RefactoringMiner {
    RefactoringMiner::new(MinerConfig::default())
}

fn detect(miner: &RefactoringMiner, before: &Model, after: &Model) -> MiningResult {
    miner
        .detect(before, after, &RenameHints::new(), &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_source_snapshot_skips_broken_files() {
    let snapshot = SourceSnapshot::new()
        .root("src")
        .before_file("src/a/Clock.java", "class a.Clock\nop now int")
        .after_file("src/a/Clock.java", "class a.Clock\nop now long")
        .before_file("src/a/Broken.java", "garbage")
        .after_file("src/a/Broken.java", "garbage")
        .after_file("test/a/ClockTest.java", "not parsed at all");

    let mined = miner()
        .detect_sources(&LineFrontEnd, &snapshot, &CancellationToken::new())
        .unwrap();

    assert_eq!(mined.before.len(), 1);
    assert_eq!(mined.after.len(), 1);
    assert_eq!(mined.after.type_decl(TypeRef(0)).file_path, "src/a/Clock.java");
    assert_eq!(
        mined.result.skipped_files,
        vec![SkippedFile {
            path: "src/a/Broken.java".to_string(),
            reason: "Failed to parse src/a/Broken.java: unexpected line 'garbage'".to_string(),
        }]
    );
    assert_kinds(&mined.result, &[RefactoringKind::ChangeReturnType]);
    assert_eq!(mined.result.reports[0].before_ranges[0].file_path, "src/a/Clock.java");

    let json = serde_json::to_value(&mined.result.reports).unwrap();
    assert_eq!(json[0]["kind"], "ChangeReturnType");
    assert_eq!(json[0]["name"], "Change Return Type");
    assert_eq!(json[0]["beforeRanges"][0]["filePath"], "src/a/Clock.java");
}

#[test]
fn test_malformed_file_is_skipped() {
    let snapshot = SourceSnapshot::new()
        .before_file("a/Clock.java", "class a.Clock\nop now int")
        .after_file("a/Clock.java", "class a.Clock\nop now int")
        .after_file("a/Orphan.java", "op tick void");

    let mined = miner()
        .detect_sources(&LineFrontEnd, &snapshot, &CancellationToken::new())
        .unwrap();
    assert!(mined.result.is_empty());
    assert_eq!(mined.result.skipped_files.len(), 1);
    assert_eq!(
        mined.result.skipped_files[0].reason,
        "Malformed declaration tree in a/Orphan.java: operation outside a class"
    );
}

#[test]
fn test_cancelled_source_run_is_an_error() {
    let snapshot = SourceSnapshot::new()
        .before_file("a/Clock.java", "class a.Clock\nop now int")
        .after_file("a/Clock.java", "class a.Clock\nop now long");
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(miner().detect_sources(&LineFrontEnd, &snapshot, &cancel).is_err());
}

#[test]
fn test_yaml_config_drives_the_miner() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\npreset: fast\noverrides:\n  mapper:\n    similarity_floor: 0.55"
    )
    .unwrap();

    let config = MinerConfig::from_yaml(file.path()).unwrap();
    assert_eq!(config.mapper.similarity_floor, 0.55);

    let miner = RefactoringMiner::new(config);
    let before = model_of("a.Orders", vec![op("ship", fixture_steps(0..4, "order"))]);
    let after = model_of("a.Orders", vec![op("send", fixture_steps(0..4, "order"))]);
    let result = detect(&miner, &before, &after);
    assert_kinds(&result, &[RefactoringKind::RenameOperation]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let before = model_of("a.Sink", vec![op("process", fixture_mixed_body(12))]);
    let after = model_of(
        "a.Sink",
        vec![
            op("process", fixture_mixed_body_renamed(6)),
            op("flush", fixture_mixed_body_renamed(12).split_off(6)),
        ],
    );
    let miner = miner();
    let first = detect(&miner, &before, &after);
    let second = detect(&miner, &before, &after);
    assert_eq!(first.refactorings, second.refactorings);
    assert_eq!(first.reports, second.reports);
}

fn leaf_statement() -> impl Strategy<Value = Statement> {
    (0..5usize, 0..3usize).prop_map(|(f, a)| expr_stmt(call(&format!("f{f}"), vec![var(&format!("a{a}"))])))
}

fn nested_statement() -> impl Strategy<Value = Statement> {
    leaf_statement().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (0..2usize, prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(c, then)| if_then(var(&format!("c{c}")), then)),
            (
                0..2usize,
                prop::collection::vec(inner.clone(), 1..3),
                prop::collection::vec(inner.clone(), 1..3)
            )
                .prop_map(|(c, then, otherwise)| if_else(var(&format!("c{c}")), then, otherwise)),
            (0..2usize, prop::collection::vec(inner, 1..4))
                .prop_map(|(c, body)| while_loop(var(&format!("c{c}")), body)),
        ]
    })
}

fn nested_body() -> impl Strategy<Value = Vec<Statement>> {
    prop::collection::vec(nested_statement(), 1..8)
}

fn op_ref() -> OperationRef {
    OperationRef::new(TypeRef(0), 0)
}

/// Insert `assert true;` at top-level slot `k` and return its pre-order id
fn insert_assert(body: &mut Vec<Statement>, k: usize) -> u32 {
    let k = k.min(body.len());
    body.insert(k, expr_stmt(raw("assert true")));
    body[..k].iter().map(Statement::subtree_size).sum::<usize>() as u32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_mapping_is_one_to_one(before in nested_body(), after in nested_body()) {
        let mapper = BodyMapper::new(Default::default());
        let mapping = mapper.map_operations(op_ref(), &op("m", before), op_ref(), &op("m", after));
        prop_assert!(mapping.is_bijective());
    }

    #[test]
    fn prop_detection_is_deterministic(before in nested_body(), after in nested_body()) {
        let before = model_of("a.Job", vec![op("run", before)]);
        let after = model_of("a.Job", vec![op("run", after)]);
        let miner = miner();
        let first = detect(&miner, &before, &after);
        let second = detect(&miner, &before, &after);
        prop_assert_eq!(first.descriptions(), second.descriptions());
    }

    #[test]
    fn prop_common_statement_keeps_edges(before in nested_body(), after in nested_body(), slot in 0..8usize) {
        let mapper = BodyMapper::new(Default::default());
        let baseline = mapper.map_operations(op_ref(), &op("m", before.clone()), op_ref(), &op("m", after.clone()));

        let slot = slot.min(before.len()).min(after.len());
        let mut longer_before = before;
        let mut longer_after = after;
        let inserted_before = insert_assert(&mut longer_before, slot);
        let inserted_after = insert_assert(&mut longer_after, slot);
        let extended = mapper.map_operations(op_ref(), &op("m", longer_before), op_ref(), &op("m", longer_after));

        prop_assert!(extended.is_bijective());
        let kept = extended
            .edges
            .iter()
            .filter(|e| e.before.statement != inserted_before && e.after.statement != inserted_after)
            .count();
        prop_assert!(kept >= baseline.edges.len(), "baseline {} extended {}", baseline.edges.len(), kept);
    }
}
