//! Refactoring detection use case
//!
//! Runs every classifier against one model diff and merges the candidates.
//! Classifiers that nest new mappings under existing ones (extract, inline)
//! go first because they hand statements back to the parent mappings, which
//! changes the coverage the rename/move checks see later.

use super::classifiers::{
    attributes, extract, hierarchy, inline, local_variables, merge_split, move_code, operations, parameterize,
    types, variables,
};
use super::context::DetectionContext;
use super::merge::merge_candidates;
use crate::config::ClassifierConfig;
use crate::errors::Result;
use crate::features::body_mapper::{BodyMapper, MapperArena};
use crate::features::model_diff::ModelDiff;
use crate::features::refactoring::domain::Refactoring;
use crate::shared::models::Model;
use crate::shared::CancellationToken;
use tracing::{debug, info, warn};

pub struct RefactoringDetector {
    config: ClassifierConfig,
}

impl RefactoringDetector {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify and merge. Mappings created along the way are appended to
    /// `diff.mappers`, so every `MapperId` in the result resolves there.
    ///
    /// When `cancel` fires, the body-mapping classifiers that have not started
    /// are skipped; declaration-level classifiers still run on what exists.
    pub fn detect(
        &self,
        before: &Model,
        after: &Model,
        diff: &mut ModelDiff,
        mapper: &BodyMapper,
        cancel: &CancellationToken,
    ) -> Result<Vec<Refactoring>> {
        let mut arena = std::mem::take(&mut diff.mappers);
        let outcome = self.classify(before, after, diff, mapper, &mut arena, cancel);
        diff.mappers = arena;
        let candidates = outcome?;

        let found = candidates.len();
        let merged = merge_candidates(candidates, &diff.mappers)?;
        info!(candidates = found, accepted = merged.len(), "Refactorings merged");
        Ok(merged)
    }

    fn classify(
        &self,
        before: &Model,
        after: &Model,
        diff: &ModelDiff,
        mapper: &BodyMapper,
        arena: &mut MapperArena,
        cancel: &CancellationToken,
    ) -> Result<Vec<Refactoring>> {
        let ctx = DetectionContext::new(before, after, diff, &self.config, mapper);
        let mut candidates = Vec::new();

        let mut nested: Vec<(&str, fn(&DetectionContext<'_>, &mut MapperArena) -> Vec<Refactoring>)> = vec![
            ("extract", extract::classify),
            ("inline", inline::classify),
            ("merge_split", merge_split::classify),
        ];
        if self.config.detect_parameterize_test {
            nested.push(("parameterize", parameterize::classify));
        }
        nested.push(("move_code", move_code::classify));

        for (name, classify) in nested {
            if cancel.is_cancelled() {
                warn!(classifier = name, "Cancelled, skipping remaining body classifiers");
                break;
            }
            let found = classify(&ctx, arena);
            debug!(classifier = name, found = found.len(), "Classifier finished");
            candidates.extend(found);
        }

        // read-only from here on
        let arena: &MapperArena = arena;
        let (((ops, vars), locals), ((tys, supers), attrs)) = rayon::join(
            || {
                rayon::join(
                    || rayon::join(|| operations::classify(&ctx, arena), || variables::classify(&ctx, arena)),
                    || local_variables::classify(&ctx),
                )
            },
            || {
                rayon::join(
                    || rayon::join(|| types::classify(&ctx), || hierarchy::classify(&ctx)),
                    || attributes::classify(&ctx),
                )
            },
        );
        debug!(
            operations = ops.len(),
            variables = vars.len() + locals.len(),
            types = tys.len() + supers.len(),
            attributes = attrs.len(),
            "Declaration classifiers finished"
        );
        candidates.extend(ops);
        candidates.extend(tys);
        candidates.extend(supers);
        candidates.extend(attrs);
        candidates.extend(locals);
        candidates.extend(vars);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapperConfig, MatcherConfig};
    use crate::features::model_diff::{ModelDiffer, RenameHints};
    use crate::features::refactoring::domain::RefactoringKind;
    use crate::shared::models::builders::{call, expr_stmt, var, OperationBuilder, TypeBuilder};

    fn run(before: &Model, after: &Model, cancel: &CancellationToken) -> (Vec<Refactoring>, ModelDiff) {
        let differ = ModelDiffer::new(MatcherConfig::default(), MapperConfig::default(), false);
        let mut diff = differ.diff(before, after, &RenameHints::new(), &CancellationToken::new());
        let detector = RefactoringDetector::new(ClassifierConfig::default());
        let found = detector
            .detect(before, after, &mut diff, differ.mapper(), cancel)
            .unwrap();
        (found, diff)
    }

    fn service(body: Vec<crate::shared::models::Statement>) -> Model {
        Model::new(vec![TypeBuilder::new("a.Service")
            .operation(OperationBuilder::new("handle").param("Request", "req").body(body).build())
            .build()])
    }

    #[test]
    fn test_extract_wins_and_mappers_resolve() {
        let before = service(vec![
            expr_stmt(call("validate", vec![var("req")])),
            expr_stmt(call("audit", vec![var("req")])),
            expr_stmt(call("store", vec![var("req")])),
        ]);
        let after = Model::new(vec![TypeBuilder::new("a.Service")
            .operation(
                OperationBuilder::new("handle")
                    .param("Request", "req")
                    .body(vec![expr_stmt(call("persist", vec![var("req")]))])
                    .build(),
            )
            .operation(
                OperationBuilder::new("persist")
                    .param("Request", "req")
                    .body(vec![
                        expr_stmt(call("validate", vec![var("req")])),
                        expr_stmt(call("audit", vec![var("req")])),
                        expr_stmt(call("store", vec![var("req")])),
                    ])
                    .build(),
            )
            .build()]);

        let (found, diff) = run(&before, &after, &CancellationToken::new());
        let kinds: Vec<RefactoringKind> = found.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![RefactoringKind::ExtractOperation]);
        for id in found[0].cited_mappers() {
            assert!(diff.mapping(id).is_some());
        }
    }

    #[test]
    fn test_cancelled_run_keeps_declaration_changes() {
        let before = Model::new(vec![TypeBuilder::new("a.Service")
            .operation(OperationBuilder::new("handle").returns("int").build())
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Service")
            .operation(OperationBuilder::new("handle").returns("long").build())
            .build()]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (found, _) = run(&before, &after, &cancel);
        let kinds: Vec<RefactoringKind> = found.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![RefactoringKind::ChangeReturnType]);
    }
}
