//! Inline Method / Move And Inline Method
//!
//! Mirror of extraction: a removed operation invoked from a matched caller
//! is mapped, with its parameters replaced by the call-site arguments,
//! against the caller's residual after statements. Each call site gets its
//! own mapper run over the statements earlier sites left unclaimed.

use super::support::{call_sites, has_substantive_edge, no_substitution};
use crate::features::body_mapper::{substitution_for_call, FragmentTree, MapperArena, MappingRequest, StatementId};
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::shared::models::OperationRef;
use rustc_hash::FxHashSet;
use tracing::trace;

pub fn classify(ctx: &DetectionContext<'_>, arena: &mut MapperArena) -> Vec<Refactoring> {
    let removed: Vec<OperationRef> = ctx
        .diff
        .removed_operations
        .iter()
        .copied()
        .filter(|&r| {
            let op = ctx.before.operation(r);
            op.has_body() && !op.is_constructor
        })
        .collect();
    if removed.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let empty = no_substitution();
    for (m, parent) in ctx.mapped_matches() {
        let Some(mapping) = arena.get(parent) else {
            continue;
        };
        if mapping.unmatched_after.is_empty() {
            continue;
        }
        let residual_after = mapping.unmatched_after.clone();
        // non-exact caller edges: (before, after)
        let loose: Vec<(StatementId, StatementId)> = mapping
            .edges
            .iter()
            .filter(|e| !e.is_exact())
            .map(|e| (e.before.statement, e.after.statement))
            .collect();
        let exact_before: FxHashSet<StatementId> = mapping
            .edges
            .iter()
            .filter(|e| e.is_exact())
            .map(|e| e.before.statement)
            .collect();

        let target_before = ctx.before.operation(m.before);
        let target_after = ctx.after.operation(m.after);
        let before_tree = FragmentTree::for_body(target_before.body.as_ref(), &empty);
        let after_tree = FragmentTree::for_body(target_after.body.as_ref(), &empty);

        for &candidate in &removed {
            if candidate == m.before {
                continue;
            }
            let callee = ctx.before.operation(candidate);
            // still invoked after the change: not inlined here
            if !call_sites(&after_tree, callee).is_empty() {
                continue;
            }
            let sites: Vec<_> = call_sites(&before_tree, callee)
                .into_iter()
                .filter(|s| !exact_before.contains(&s.statement))
                .collect();

            let mut claimed: FxHashSet<StatementId> = FxHashSet::default();
            for site in sites {
                // an after statement the caller paired with the call site
                // itself is offered back to the inlined body
                let stolen: Vec<StatementId> = loose
                    .iter()
                    .filter(|&&(b, a)| b == site.statement && !claimed.contains(&a))
                    .map(|&(_, a)| a)
                    .collect();
                let mut scope: Vec<StatementId> = residual_after
                    .iter()
                    .copied()
                    .filter(|id| !claimed.contains(id))
                    .collect();
                scope.extend(&stolen);
                if scope.is_empty() {
                    break;
                }
                let subst = substitution_for_call(&callee.parameter_names(), site.call.arguments());
                let callee_tree = FragmentTree::for_body(callee.body.as_ref(), &subst);
                let request = MappingRequest::new(candidate, &callee_tree, m.after, &after_tree).after_scope(&scope);
                let inlined = ctx.mapper.map(request).with_parent(parent);
                if inlined.mapped_count() == 0
                    || inlined.coverage() < ctx.config.inline_coverage
                    || !has_substantive_edge(&inlined, &callee_tree)
                {
                    trace!(
                        candidate = %ctx.before.operation_name(candidate),
                        coverage = inlined.coverage(),
                        "Inline candidate rejected"
                    );
                    continue;
                }
                let mapped = inlined.mapped_after();
                let reclaimed: FxHashSet<StatementId> = stolen.into_iter().filter(|a| mapped.contains(a)).collect();
                if !reclaimed.is_empty() {
                    if let Some(caller) = arena.get_mut(parent) {
                        caller.unmap_after(&reclaimed);
                    }
                }
                claimed.extend(mapped);
                let mapper = arena.push(inlined);
                let refactoring = if candidate.owner == m.before.owner {
                    Refactoring::InlineOperation {
                        inlined: candidate,
                        target_before: m.before,
                        target_after: m.after,
                        mapper,
                    }
                } else {
                    Refactoring::MoveAndInlineOperation {
                        inlined: candidate,
                        target_before: m.before,
                        target_after: m.after,
                        mapper,
                    }
                };
                out.push(refactoring);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, MapperConfig, MatcherConfig};
    use crate::features::body_mapper::BodyMapper;
    use crate::features::model_diff::{ModelDiffer, RenameHints};
    use crate::shared::models::builders::{call, declare, expr_stmt, infix, method_call, var, OperationBuilder, TypeBuilder};
    use crate::shared::models::Model;
    use crate::shared::CancellationToken;

    fn detect(before: &Model, after: &Model) -> (Vec<Refactoring>, MapperArena) {
        let differ = ModelDiffer::new(MatcherConfig::default(), MapperConfig::default(), false);
        let mut diff = differ.diff(before, after, &RenameHints::new(), &CancellationToken::new());
        let mut arena = std::mem::take(&mut diff.mappers);
        let mapper = BodyMapper::new(MapperConfig::default());
        let config = ClassifierConfig::default();
        let ctx = DetectionContext::new(before, after, &diff, &config, &mapper);
        let found = classify(&ctx, &mut arena);
        (found, arena)
    }

    #[test]
    fn test_inline_at_two_call_sites() {
        let before = Model::new(vec![TypeBuilder::new("a.Cart")
            .operation(
                OperationBuilder::new("checkout")
                    .body(vec![
                        expr_stmt(call("charge", vec![var("first")])),
                        expr_stmt(call("charge", vec![var("second")])),
                        expr_stmt(method_call(var("events"), "publish", vec![var("order")])),
                    ])
                    .build(),
            )
            .operation(
                OperationBuilder::new("charge")
                    .param("Item", "item")
                    .body(vec![
                        declare("long", "cents", method_call(var("item"), "price", vec![])),
                        expr_stmt(method_call(var("wallet"), "debit", vec![infix(var("cents"), "*", var("rate"))])),
                    ])
                    .build(),
            )
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Cart")
            .operation(
                OperationBuilder::new("checkout")
                    .body(vec![
                        declare("long", "cents", method_call(var("first"), "price", vec![])),
                        expr_stmt(method_call(var("wallet"), "debit", vec![infix(var("cents"), "*", var("rate"))])),
                        declare("long", "cents", method_call(var("second"), "price", vec![])),
                        expr_stmt(method_call(var("wallet"), "debit", vec![infix(var("cents"), "*", var("rate"))])),
                        expr_stmt(method_call(var("events"), "publish", vec![var("order")])),
                    ])
                    .build(),
            )
            .build()]);

        let (found, arena) = detect(&before, &after);
        assert_eq!(found.len(), 2);
        for r in &found {
            let Refactoring::InlineOperation { inlined, mapper, .. } = r else {
                panic!("expected inline, got {:?}", r);
            };
            assert_eq!(before.operation(*inlined).name, "charge");
            let mapping = arena.get(*mapper).unwrap();
            assert_eq!(mapping.coverage(), 1.0);
        }
    }
}
