//! Parameterize Test

use super::support::no_substitution;
use crate::features::body_mapper::{BodyMapping, FragmentTree, MapperArena, MappingRequest};
use crate::features::refactoring::application::context::DetectionContext;
use crate::features::refactoring::domain::Refactoring;
use crate::features::replacement::ReplacementKind;
use crate::shared::models::{Operation, OperationRef};

/// Sibling tests that must fold into one parameterized test
const MIN_COLLAPSED_TESTS: usize = 2;

fn is_parameterized(op: &Operation) -> bool {
    op.has_body()
        && !op.parameters.is_empty()
        && op.annotations.iter().any(|a| a.name.ends_with("ParameterizedTest"))
}

/// Every statement mapped on both sides, and the only differences are
/// literals turned into one of the new parameters
fn literals_became_parameters(mapping: &BodyMapping, new_parameters: &[&str]) -> bool {
    let mut any = false;
    for r in mapping.replacements() {
        if r.kind != ReplacementKind::LiteralToVariable || !new_parameters.contains(&r.after.as_str()) {
            return false;
        }
        any = true;
    }
    any && mapping.unmatched_before.is_empty() && mapping.unmatched_after.is_empty()
}

pub fn classify(ctx: &DetectionContext<'_>, arena: &mut MapperArena) -> Vec<Refactoring> {
    let mut out = Vec::new();
    let empty = no_substitution();
    for tm in &ctx.diff.type_matches {
        for into in ctx.after.operation_refs(tm.after) {
            let target = ctx.after.operation(into);
            if !is_parameterized(target) {
                continue;
            }
            let mut candidates: Vec<OperationRef> =
                ctx.diff.match_for_after(into).map(|m| m.before).into_iter().collect();
            candidates.extend(
                ctx.diff
                    .removed_operations
                    .iter()
                    .copied()
                    .filter(|r| r.owner == tm.before),
            );

            let after_tree = FragmentTree::for_body(target.body.as_ref(), &empty);
            let mut tests = Vec::new();
            let mut mappers = Vec::new();
            for candidate in candidates {
                let test = ctx.before.operation(candidate);
                if !test.is_test() || !test.has_body() {
                    continue;
                }
                let new_parameters: Vec<&str> = target
                    .parameter_names()
                    .into_iter()
                    .filter(|p| !test.parameter_names().contains(p))
                    .collect();
                let before_tree = FragmentTree::for_body(test.body.as_ref(), &empty);
                let mapping = ctx
                    .mapper
                    .map(MappingRequest::new(candidate, &before_tree, into, &after_tree));
                if !literals_became_parameters(&mapping, &new_parameters) {
                    continue;
                }
                tests.push(candidate);
                mappers.push(arena.push(mapping));
            }

            if tests.len() >= MIN_COLLAPSED_TESTS {
                out.push(Refactoring::ParameterizeTest {
                    tests,
                    into,
                    parameters: target.parameters.iter().map(|p| p.name.clone()).collect(),
                    mappers,
                });
            }
        }
    }
    out
}
