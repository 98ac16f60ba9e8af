//! Extract Method / Extract And Move Method
//!
//! For every matched pair, the caller's residual before statements are mapped
//! against each added operation invoked from a non-exact after statement, with
//! the callee's parameters replaced by the call-site arguments. An accepted
//! mapping becomes the parent of the next level: statements it left over are
//! tried against operations the extracted one calls in turn.

use super::support::{call_sites, has_substantive_edge, no_substitution};
use crate::features::body_mapper::{
    substitution_for_call, FragmentTree, MapperArena, MapperId, MappingRequest, StatementId,
};
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::shared::models::OperationRef;
use rustc_hash::FxHashSet;
use tracing::trace;

/// One level of the extraction chain
struct Caller {
    source_before: OperationRef,
    caller_after: OperationRef,
    residual: Vec<StatementId>,
    parent: MapperId,
    /// After statements of the caller that already existed verbatim
    exact_after: FxHashSet<StatementId>,
}

pub fn classify(ctx: &DetectionContext<'_>, arena: &mut MapperArena) -> Vec<Refactoring> {
    let added: Vec<OperationRef> = ctx
        .diff
        .added_operations
        .iter()
        .copied()
        .filter(|&r| {
            let op = ctx.after.operation(r);
            op.has_body() && !op.is_constructor
        })
        .collect();
    if added.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (m, id) in ctx.mapped_matches() {
        let Some(mapping) = arena.get(id) else {
            continue;
        };
        if mapping.unmatched_before.is_empty() {
            continue;
        }
        let caller = Caller {
            source_before: m.before,
            caller_after: m.after,
            residual: mapping.unmatched_before.clone(),
            parent: id,
            exact_after: exact_after_ids(mapping),
        };
        let empty = no_substitution();
        let before_tree = FragmentTree::for_body(ctx.before.operation(m.before).body.as_ref(), &empty);
        extract_from(ctx, arena, &before_tree, &added, caller, 1, &mut out);
    }
    out
}

fn exact_after_ids(mapping: &crate::features::body_mapper::BodyMapping) -> FxHashSet<StatementId> {
    mapping
        .edges
        .iter()
        .filter(|e| e.is_exact())
        .map(|e| e.after.statement)
        .collect()
}

fn extract_from(
    ctx: &DetectionContext<'_>,
    arena: &mut MapperArena,
    before_tree: &FragmentTree<'_>,
    added: &[OperationRef],
    caller: Caller,
    depth: usize,
    out: &mut Vec<Refactoring>,
) {
    if depth > ctx.config.max_extract_depth || caller.residual.is_empty() {
        return;
    }
    let empty = no_substitution();
    let source = ctx.before.operation(caller.source_before);
    let source_tree = FragmentTree::for_body(source.body.as_ref(), &empty);
    let caller_op = ctx.after.operation(caller.caller_after);
    let caller_tree = FragmentTree::for_body(caller_op.body.as_ref(), &empty);

    // non-exact parent edges: (before, after)
    let loose: Vec<(StatementId, StatementId)> = arena
        .get(caller.parent)
        .map(|p| {
            p.edges
                .iter()
                .filter(|e| !e.is_exact())
                .map(|e| (e.before.statement, e.after.statement))
                .collect()
        })
        .unwrap_or_default();

    for &candidate in added {
        if candidate == caller.caller_after {
            continue;
        }
        let callee = ctx.after.operation(candidate);
        // the invocation must be new, not one the source already made
        if !call_sites(&source_tree, callee).is_empty() {
            continue;
        }
        let sites: Vec<_> = call_sites(&caller_tree, callee)
            .into_iter()
            .filter(|s| !caller.exact_after.contains(&s.statement))
            .collect();
        let Some(site) = sites.first() else {
            continue;
        };

        // a before statement the parent paired with the call site itself is
        // offered back to the extraction
        let site_ids: FxHashSet<StatementId> = sites.iter().map(|s| s.statement).collect();
        let stolen: Vec<StatementId> = loose
            .iter()
            .filter(|(_, a)| site_ids.contains(a))
            .map(|&(b, _)| b)
            .collect();
        let mut scope = caller.residual.clone();
        scope.extend(&stolen);

        let subst = substitution_for_call(&callee.parameter_names(), site.call.arguments());
        let callee_tree = FragmentTree::for_body(callee.body.as_ref(), &subst);
        let request = MappingRequest::new(caller.source_before, before_tree, candidate, &callee_tree)
            .before_scope(&scope);
        let mapping = ctx.mapper.map(request).with_parent(caller.parent);
        let threshold = ctx.config.extract_coverage;
        if mapping.mapped_count() == 0
            || mapping.after_coverage() < threshold
            || !has_substantive_edge(&mapping, before_tree)
        {
            trace!(
                candidate = %ctx.after.operation_name(candidate),
                coverage = mapping.after_coverage(),
                "Extract candidate rejected"
            );
            continue;
        }

        let mapped = mapping.mapped_before();
        let reclaimed: FxHashSet<StatementId> = stolen.into_iter().filter(|b| mapped.contains(b)).collect();
        if !reclaimed.is_empty() {
            if let Some(parent) = arena.get_mut(caller.parent) {
                parent.unmap_before(&reclaimed);
            }
        }

        let duplicates = ctx.mapper.spawn_duplicates(&request, &mapping);
        let residual = mapping.unmatched_before.clone();
        let exact_after = exact_after_ids(&mapping);
        let id = arena.push(mapping);
        out.push(extraction(caller.source_before, caller.caller_after, candidate, id));
        for dup in duplicates {
            if dup.after_coverage() >= threshold {
                let dup_id = arena.push(dup);
                out.push(extraction(caller.source_before, caller.caller_after, candidate, dup_id));
            }
        }

        let nested = Caller {
            source_before: caller.source_before,
            caller_after: candidate,
            residual,
            parent: id,
            exact_after,
        };
        extract_from(ctx, arena, before_tree, added, nested, depth + 1, out);
    }
}

fn extraction(
    source_before: OperationRef,
    source_after: OperationRef,
    extracted: OperationRef,
    mapper: MapperId,
) -> Refactoring {
    if extracted.owner == source_after.owner {
        Refactoring::ExtractOperation {
            source_before,
            source_after,
            extracted,
            mapper,
        }
    } else {
        Refactoring::ExtractAndMoveOperation {
            source_before,
            source_after,
            extracted,
            mapper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, MapperConfig, MatcherConfig};
    use crate::features::body_mapper::BodyMapper;
    use crate::features::model_diff::{ModelDiffer, RenameHints};
    use crate::shared::models::builders::{call, expr_stmt, method_call, var, OperationBuilder, TypeBuilder};
    use crate::shared::models::{Model, Statement};
    use crate::shared::CancellationToken;

    fn log(msg: &str) -> Statement {
        expr_stmt(method_call(var("log"), "info", vec![var(msg)]))
    }

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
    fn test_extract_with_argument_substitution() {
        let before = Model::new(vec![TypeBuilder::new("a.Service")
            .operation(
                OperationBuilder::new("handle")
                    .param("Request", "req")
                    .body(vec![
                        expr_stmt(call("validate", vec![var("req")])),
                        expr_stmt(call("audit", vec![var("req")])),
                        expr_stmt(call("store", vec![var("req")])),
                        log("done"),
                    ])
                    .build(),
            )
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Service")
            .operation(
                OperationBuilder::new("handle")
                    .param("Request", "req")
                    .body(vec![expr_stmt(call("persist", vec![var("req")])), log("done")])
                    .build(),
            )
            .operation(
                OperationBuilder::new("persist")
                    .param("Request", "r")
                    .body(vec![
                        expr_stmt(call("validate", vec![var("r")])),
                        expr_stmt(call("audit", vec![var("r")])),
                        expr_stmt(call("store", vec![var("r")])),
                    ])
                    .build(),
            )
            .build()]);

        let (found, arena) = detect(&before, &after);
        assert_eq!(found.len(), 1);
        let Refactoring::ExtractOperation { extracted, mapper, .. } = &found[0] else {
            panic!("expected extract, got {:?}", found[0]);
        };
        assert_eq!(after.operation(*extracted).name, "persist");
        let mapping = arena.get(*mapper).unwrap();
        assert_eq!(mapping.mapped_count(), 3);
        assert_eq!(mapping.exact_count(), 3);
        assert!(mapping.parent.is_some());
    }

    #[test]
    fn test_existing_call_is_not_an_extraction() {
        let helper = OperationBuilder::new("helper")
            .body(vec![expr_stmt(call("step", vec![]))])
            .build();
        let before = Model::new(vec![TypeBuilder::new("a.Job")
            .operation(
                OperationBuilder::new("run")
                    .body(vec![expr_stmt(call("helper", vec![])), expr_stmt(call("step", vec![]))])
                    .build(),
            )
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Job")
            .operation(
                OperationBuilder::new("run")
                    .body(vec![expr_stmt(call("helper", vec![]))])
                    .build(),
            )
            .operation(helper)
            .build()]);

        let (found, _) = detect(&before, &after);
        assert!(found.is_empty());
    }

    #[test]
    fn test_nested_extraction_chain() {
        let before = Model::new(vec![TypeBuilder::new("a.Report")
            .operation(
                OperationBuilder::new("render")
                    .body(vec![
                        expr_stmt(call("header", vec![var("page")])),
                        expr_stmt(call("title", vec![var("page")])),
                        expr_stmt(call("rows", vec![var("page")])),
                        expr_stmt(call("totals", vec![var("page")])),
                    ])
                    .build(),
            )
            .build()]);
        let after = Model::new(vec![TypeBuilder::new("a.Report")
            .operation(
                OperationBuilder::new("render")
                    .body(vec![expr_stmt(call("renderTop", vec![var("page")]))])
                    .build(),
            )
            .operation(
                OperationBuilder::new("renderTop")
                    .param("Page", "page")
                    .body(vec![
                        expr_stmt(call("header", vec![var("page")])),
                        expr_stmt(call("title", vec![var("page")])),
                        expr_stmt(call("renderBody", vec![var("page")])),
                    ])
                    .build(),
            )
            .operation(
                OperationBuilder::new("renderBody")
                    .param("Page", "page")
                    .body(vec![
                        expr_stmt(call("rows", vec![var("page")])),
                        expr_stmt(call("totals", vec![var("page")])),
                    ])
                    .build(),
            )
            .build()]);

        let (found, arena) = detect(&before, &after);
        let names: Vec<(String, String)> = found
            .iter()
            .filter_map(|r| match r {
                Refactoring::ExtractOperation {
                    source_after,
                    extracted,
                    ..
                } => Some((
                    after.operation(*source_after).name.clone(),
                    after.operation(*extracted).name.clone(),
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("render".to_string(), "renderTop".to_string()),
                ("renderTop".to_string(), "renderBody".to_string()),
            ]
        );
        let Refactoring::ExtractOperation { mapper, .. } = &found[1] else {
            panic!("expected nested extract");
        };
        assert_eq!(arena.depth(*mapper), 2);
    }
}
