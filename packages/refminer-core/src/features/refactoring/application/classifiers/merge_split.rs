//! Merge Method / Split Method
//!
//! Works inside one matched type pair. A merge is several before operations
//! whose bodies land on disjoint parts of one after operation; a split is the
//! reverse. Each contributing pair is mapped on the statements the earlier
//! contributors left, and the union has to cover both sides.

use super::support::{any_calls, has_substantive_edge, no_substitution};
use crate::features::body_mapper::{BodyMapping, FragmentTree, MapperArena, MappingRequest, StatementId};
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::shared::models::{Operation, OperationRef};
use rustc_hash::FxHashSet;
use tracing::debug;

fn substantive(op: &Operation) -> bool {
    op.has_body() && !op.is_constructor
}

pub fn classify(ctx: &DetectionContext<'_>, arena: &mut MapperArena) -> Vec<Refactoring> {
    let mut out = Vec::new();
    for tm in &ctx.diff.type_matches {
        let removed: Vec<OperationRef> = ctx
            .diff
            .removed_operations
            .iter()
            .copied()
            .filter(|r| r.owner == tm.before && substantive(ctx.before.operation(*r)))
            .collect();
        let added: Vec<OperationRef> = ctx
            .diff
            .added_operations
            .iter()
            .copied()
            .filter(|r| r.owner == tm.after && substantive(ctx.after.operation(*r)))
            .collect();

        if !removed.is_empty() {
            for target in ctx.after.operation_refs(tm.after) {
                if !substantive(ctx.after.operation(target)) {
                    continue;
                }
                let mut sources: Vec<OperationRef> = ctx.diff.match_for_after(target).map(|m| m.before).into_iter().collect();
                sources.extend(removed.iter().copied());
                if let Some(r) = detect_merge(ctx, arena, &sources, target) {
                    out.push(r);
                }
            }
        }

        if !added.is_empty() {
            for source in ctx.before.operation_refs(tm.before) {
                if !substantive(ctx.before.operation(source)) {
                    continue;
                }
                let mut targets: Vec<OperationRef> = ctx.diff.match_for_before(source).map(|m| m.after).into_iter().collect();
                targets.extend(added.iter().copied());
                if let Some(r) = detect_split(ctx, arena, source, &targets) {
                    out.push(r);
                }
            }
        }
    }
    out
}

fn detect_merge(
    ctx: &DetectionContext<'_>,
    arena: &mut MapperArena,
    sources: &[OperationRef],
    target: OperationRef,
) -> Option<Refactoring> {
    if sources.len() < 2 {
        return None;
    }
    let threshold = ctx.config.merge_split_coverage;
    let empty = no_substitution();
    let after_tree = FragmentTree::for_body(ctx.after.operation(target).body.as_ref(), &empty);
    let mut covered: FxHashSet<StatementId> = FxHashSet::default();
    let mut accepted: Vec<(OperationRef, BodyMapping)> = Vec::new();

    for &source in sources {
        let scope: Vec<StatementId> = after_tree.ids().into_iter().filter(|id| !covered.contains(id)).collect();
        if scope.is_empty() {
            break;
        }
        let before_tree = FragmentTree::for_body(ctx.before.operation(source).body.as_ref(), &empty);
        let mapping = ctx
            .mapper
            .map(MappingRequest::new(source, &before_tree, target, &after_tree).after_scope(&scope));
        if mapping.coverage() < threshold || !has_substantive_edge(&mapping, &before_tree) {
            continue;
        }
        covered.extend(mapping.mapped_after());
        accepted.push((source, mapping));
    }

    if accepted.len() < 2 || (covered.len() as f64) < threshold * after_tree.len() as f64 {
        return None;
    }
    let merged_ops: Vec<&Operation> = accepted.iter().map(|(r, _)| ctx.before.operation(*r)).collect();
    if any_calls(&merged_ops, &merged_ops) {
        debug!(target = %ctx.after.operation_name(target), "Merge candidates call each other, left to inline detection");
        return None;
    }

    let mut merged = Vec::new();
    let mut mappers = Vec::new();
    for (source, mapping) in accepted {
        merged.push(source);
        mappers.push(arena.push(mapping));
    }
    Some(Refactoring::MergeOperation {
        merged,
        into: target,
        mappers,
    })
}

fn detect_split(
    ctx: &DetectionContext<'_>,
    arena: &mut MapperArena,
    source: OperationRef,
    targets: &[OperationRef],
) -> Option<Refactoring> {
    if targets.len() < 2 {
        return None;
    }
    let threshold = ctx.config.merge_split_coverage;
    let empty = no_substitution();
    let before_tree = FragmentTree::for_body(ctx.before.operation(source).body.as_ref(), &empty);
    let mut covered: FxHashSet<StatementId> = FxHashSet::default();
    let mut accepted: Vec<(OperationRef, BodyMapping)> = Vec::new();

    for &target in targets {
        let scope: Vec<StatementId> = before_tree.ids().into_iter().filter(|id| !covered.contains(id)).collect();
        if scope.is_empty() {
            break;
        }
        let after_tree = FragmentTree::for_body(ctx.after.operation(target).body.as_ref(), &empty);
        let mapping = ctx
            .mapper
            .map(MappingRequest::new(source, &before_tree, target, &after_tree).before_scope(&scope));
        if mapping.after_coverage() < threshold || !has_substantive_edge(&mapping, &before_tree) {
            continue;
        }
        covered.extend(mapping.mapped_before());
        accepted.push((target, mapping));
    }

    if accepted.len() < 2 || (covered.len() as f64) < threshold * before_tree.len() as f64 {
        return None;
    }
    let split_ops: Vec<&Operation> = accepted.iter().map(|(r, _)| ctx.after.operation(*r)).collect();
    if any_calls(&split_ops, &split_ops) {
        debug!(source = %ctx.before.operation_name(source), "Split targets call each other, left to extract detection");
        return None;
    }

    let mut into = Vec::new();
    let mut mappers = Vec::new();
    for (target, mapping) in accepted {
        into.push(target);
        mappers.push(arena.push(mapping));
    }
    Some(Refactoring::SplitOperation {
        source,
        into,
        mappers,
    })
}
