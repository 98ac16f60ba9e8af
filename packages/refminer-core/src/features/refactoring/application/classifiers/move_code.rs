//! Move Code between two matched operations of the same type

use super::support::{has_substantive_edge, no_substitution};
use crate::features::body_mapper::{FragmentTree, MapperArena, MappingRequest, StatementId};
use crate::features::model_diff::OperationMatch;
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use rustc_hash::FxHashSet;

struct Residuals<'m> {
    pair: &'m OperationMatch,
    before: Vec<StatementId>,
    after: Vec<StatementId>,
}

pub fn classify(ctx: &DetectionContext<'_>, arena: &mut MapperArena) -> Vec<Refactoring> {
    let min = ctx.config.move_code_min_statements;
    let residuals: Vec<Residuals<'_>> = ctx
        .mapped_matches()
        .filter_map(|(m, id)| {
            let mapping = arena.get(id)?;
            Some(Residuals {
                pair: m,
                before: mapping.unmatched_before.clone(),
                after: mapping.unmatched_after.clone(),
            })
        })
        .collect();

    let empty = no_substitution();
    let mut out = Vec::new();
    for source in residuals.iter().filter(|r| r.before.len() >= min) {
        let source_op = ctx.before.operation(source.pair.before);
        let source_tree = FragmentTree::for_body(source_op.body.as_ref(), &empty);
        let texts: FxHashSet<&str> = source
            .before
            .iter()
            .map(|&id| source_tree.node(id).text.as_str())
            .collect();

        for target in residuals.iter().filter(|r| r.after.len() >= min) {
            if target.pair.before == source.pair.before || target.pair.after.owner != source.pair.after.owner {
                continue;
            }
            let target_op = ctx.after.operation(target.pair.after);
            let target_tree = FragmentTree::for_body(target_op.body.as_ref(), &empty);
            // cheap prefilter on identical statement text
            let shared = target
                .after
                .iter()
                .filter(|&&id| texts.contains(target_tree.node(id).text.as_str()))
                .count();
            if shared < min {
                continue;
            }
            let request = MappingRequest::new(source.pair.before, &source_tree, target.pair.after, &target_tree)
                .before_scope(&source.before)
                .after_scope(&target.after);
            let mapping = ctx.mapper.map(request);
            if mapping.mapped_count() < min || !has_substantive_edge(&mapping, &source_tree) {
                continue;
            }
            let mapper = arena.push(mapping);
            out.push(Refactoring::MoveCode {
                source_before: source.pair.before,
                source_after: source.pair.after,
                target_before: target.pair.before,
                target_after: target.pair.after,
                mapper,
            });
        }
    }
    out
}
