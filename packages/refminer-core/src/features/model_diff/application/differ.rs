//! Model differ: the declaration matcher entry point

use super::attributes;
use super::operations::{LeftoverPolicy, OperationMatcher, PairOutcome};
use super::types::match_types;
use crate::config::{MapperConfig, MatcherConfig};
use crate::features::body_mapper::{BodyMapper, BodyMapping};
use crate::features::model_diff::domain::{
    AttributeMatch, ModelDiff, OperationMatch, OperationMatchKind, RenameHints, TypeMatch, TypeMatchKind,
};
use crate::shared::models::{Model, OperationRef, TypeRef};
use crate::shared::CancellationToken;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ModelDiffer {
    config: MatcherConfig,
    mapper: BodyMapper,
    parallel: bool,
}

impl ModelDiffer {
    pub fn new(config: MatcherConfig, mapper_config: MapperConfig, parallel: bool) -> Self {
        Self {
            config,
            mapper: BodyMapper::new(mapper_config),
            parallel,
        }
    }

    pub fn mapper(&self) -> &BodyMapper {
        &self.mapper
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match two snapshots; never fails, ambiguities resolve by tie-breaks
    pub fn diff(
        &self,
        before: &Model,
        after: &Model,
        hints: &RenameHints,
        cancel: &CancellationToken,
    ) -> ModelDiff {
        let types = match_types(before, after, &self.config, hints);
        info!(
            common = types.matches.iter().filter(|m| m.kind == TypeMatchKind::Same).count(),
            moved = types.matches.iter().filter(|m| m.kind != TypeMatchKind::Same).count(),
            added = types.added.len(),
            removed = types.removed.len(),
            "Types matched"
        );

        let matcher = OperationMatcher::new(&self.config, &self.mapper, self.parallel);
        let run_pair = |tm: &TypeMatch| matcher.match_type_pair(before, after, tm.before, tm.after, cancel);
        let outcomes: Vec<PairOutcome> = if self.parallel {
            types.matches.par_iter().map(run_pair).collect()
        } else {
            types.matches.iter().map(run_pair).collect()
        };

        let mut diff = ModelDiff {
            type_matches: types.matches.clone(),
            removed_types: types.removed.clone(),
            added_types: types.added.clone(),
            ..ModelDiff::default()
        };

        let mut pair_mappings: Vec<Vec<BodyMapping>> = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            diff.cancelled |= outcome.cancelled;
            let mut evidence = Vec::new();
            for m in outcome.matches {
                if let Some(mapping) = &m.mapping {
                    evidence.push(mapping.clone());
                }
                let mapper = m.mapping.map(|mapping| diff.mappers.push(mapping));
                diff.operation_matches.push(OperationMatch {
                    before: m.before,
                    after: m.after,
                    kind: m.kind,
                    mapper,
                    score: m.score,
                });
            }
            pair_mappings.push(evidence);
            diff.removed_operations.extend(outcome.removed);
            diff.added_operations.extend(outcome.added);
        }
        for &t in &types.removed {
            diff.removed_operations.extend(before.operation_refs(t));
        }
        for &t in &types.added {
            diff.added_operations.extend(after.operation_refs(t));
        }

        let pair_of: FxHashMap<TypeRef, TypeRef> =
            types.matches.iter().map(|m| (m.before, m.after)).collect();
        let same_owner = |b: TypeRef, a: TypeRef| pair_of.get(&b) == Some(&a);

        if diff.cancelled {
            warn!("Cancelled during operation matching, skipping cross-type moves");
        } else {
            self.match_cross_type_operations(before, after, &mut diff, &same_owner, cancel);
        }

        for (tm, evidence) in types.matches.iter().zip(pair_mappings.iter()) {
            let refs: Vec<&BodyMapping> = evidence.iter().collect();
            let outcome = attributes::match_type_pair(before, after, tm.before, tm.after, &refs);
            diff.attribute_matches.extend(outcome.matches);
            diff.removed_attributes.extend(outcome.removed);
            diff.added_attributes.extend(outcome.added);
        }
        for &t in &types.removed {
            diff.removed_attributes.extend(before.attribute_refs(t));
        }
        for &t in &types.added {
            diff.added_attributes.extend(after.attribute_refs(t));
        }
        let moved = attributes::match_cross_type(
            before,
            after,
            &diff.removed_attributes,
            &diff.added_attributes,
            &same_owner,
        );
        Self::take_attribute_matches(&mut diff, moved);
        let evidence: Vec<&BodyMapping> = diff.mappers.iter().map(|(_, m)| m).collect();
        let renamed = attributes::match_cross_type_renamed(
            before,
            after,
            &diff.removed_attributes,
            &diff.added_attributes,
            &same_owner,
            &evidence,
        );
        Self::take_attribute_matches(&mut diff, renamed);

        diff.removed_operations.sort();
        diff.added_operations.sort();
        diff.removed_attributes.sort();
        diff.added_attributes.sort();

        debug!(
            operation_matches = diff.operation_matches.len(),
            added_operations = diff.added_operations.len(),
            removed_operations = diff.removed_operations.len(),
            mappers = diff.mappers.len(),
            "Model diff complete"
        );
        diff
    }

    fn take_attribute_matches(diff: &mut ModelDiff, matches: Vec<AttributeMatch>) {
        let matched_before: FxHashSet<_> = matches.iter().map(|m| m.before).collect();
        let matched_after: FxHashSet<_> = matches.iter().map(|m| m.after).collect();
        diff.removed_attributes.retain(|b| !matched_before.contains(b));
        diff.added_attributes.retain(|a| !matched_after.contains(a));
        diff.attribute_matches.extend(matches);
    }

    fn match_cross_type_operations(
        &self,
        before: &Model,
        after: &Model,
        diff: &mut ModelDiff,
        same_owner: &(dyn Fn(TypeRef, TypeRef) -> bool + Sync),
        cancel: &CancellationToken,
    ) {
        let matcher = OperationMatcher::new(&self.config, &self.mapper, self.parallel);
        let skip = |b: OperationRef, a: OperationRef| same_owner(b.owner, a.owner);
        let policy = LeftoverPolicy {
            kind: OperationMatchKind::CrossType,
            min_coverage: self.config.move_operation_coverage,
            pair_bodiless: false,
            skip: &skip,
        };
        let moved = matcher.match_leftovers(
            before,
            after,
            &diff.removed_operations,
            &diff.added_operations,
            cancel,
            &policy,
        );
        let moved_before: FxHashSet<OperationRef> = moved.iter().map(|m| m.before).collect();
        let moved_after: FxHashSet<OperationRef> = moved.iter().map(|m| m.after).collect();
        diff.removed_operations.retain(|b| !moved_before.contains(b));
        diff.added_operations.retain(|a| !moved_after.contains(a));
        for m in moved {
            debug!(
                before = %before.operation_name(m.before),
                after = %after.operation_name(m.after),
                "Operation moved across types"
            );
            let mapper = m.mapping.map(|mapping| diff.mappers.push(mapping));
            diff.operation_matches.push(OperationMatch {
                before: m.before,
                after: m.after,
                kind: OperationMatchKind::CrossType,
                mapper,
                score: m.score,
            });
        }
        diff.cancelled |= cancel.is_cancelled();
    }
}
