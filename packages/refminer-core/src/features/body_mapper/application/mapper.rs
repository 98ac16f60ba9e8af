//! Body mapper entry points

use super::passes::MapperState;
use crate::config::MapperConfig;
use crate::features::body_mapper::domain::{BodyMapping, Fragment, MappingEdge, MatchPass, StatementId};
use crate::features::body_mapper::infrastructure::fragments::{FragmentTree, Substitution};
use crate::features::replacement::ReplacementClassifier;
use crate::shared::models::{Operation, OperationRef};
use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One mapper invocation: two trees and optional scopes
///
/// Scopes default to the whole tree. Extract/inline detection narrows the
/// caller side to its residual statements.
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'t, 'a> {
    pub before_op: OperationRef,
    pub after_op: OperationRef,
    pub before: &'t FragmentTree<'a>,
    pub after: &'t FragmentTree<'a>,
    pub before_scope: Option<&'t [StatementId]>,
    pub after_scope: Option<&'t [StatementId]>,
}

impl<'t, 'a> MappingRequest<'t, 'a> {
    pub fn new(
        before_op: OperationRef,
        before: &'t FragmentTree<'a>,
        after_op: OperationRef,
        after: &'t FragmentTree<'a>,
    ) -> Self {
        Self {
            before_op,
            after_op,
            before,
            after,
            before_scope: None,
            after_scope: None,
        }
    }

    pub fn before_scope(mut self, scope: &'t [StatementId]) -> Self {
        self.before_scope = Some(scope);
        self
    }

    pub fn after_scope(mut self, scope: &'t [StatementId]) -> Self {
        self.after_scope = Some(scope);
        self
    }

    fn resolved_scopes(&self) -> (Vec<StatementId>, Vec<StatementId>) {
        (
            resolve(self.before, self.before_scope),
            resolve(self.after, self.after_scope),
        )
    }
}

fn resolve(tree: &FragmentTree<'_>, scope: Option<&[StatementId]>) -> Vec<StatementId> {
    match scope {
        None => tree.ids(),
        Some(ids) => {
            let mut out: Vec<StatementId> = ids
                .iter()
                .copied()
                .filter(|&id| (id as usize) < tree.len())
                .collect();
            out.sort_unstable();
            out.dedup();
            out
        }
    }
}

#[derive(Debug, Clone)]
pub struct BodyMapper {
    config: MapperConfig,
    classifier: ReplacementClassifier,
}

impl BodyMapper {
    pub fn new(config: MapperConfig) -> Self {
        let classifier = ReplacementClassifier::new(config.max_alignment_tokens);
        Self { config, classifier }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ReplacementClassifier {
        &self.classifier
    }

    /// Map two whole operation bodies without substitution
    pub fn map_operations(
        &self,
        before_ref: OperationRef,
        before: &Operation,
        after_ref: OperationRef,
        after: &Operation,
    ) -> BodyMapping {
        let empty = Substitution::default();
        let before_tree = FragmentTree::for_body(before.body.as_ref(), &empty);
        let after_tree = FragmentTree::for_body(after.body.as_ref(), &empty);
        self.map(MappingRequest::new(before_ref, &before_tree, after_ref, &after_tree))
    }

    /// Run the pass sequence; never fails, degrades to exact-only over budget
    pub fn map(&self, request: MappingRequest<'_, '_>) -> BodyMapping {
        let (before_scope, after_scope) = request.resolved_scopes();
        let deadline = (self.config.time_budget_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.config.time_budget_ms));

        let mut state = MapperState::new(
            &self.config,
            &self.classifier,
            request.before,
            request.after,
            &before_scope,
            &after_scope,
            deadline,
        );

        let pairs = before_scope.len().saturating_mul(after_scope.len());
        if pairs > self.config.max_pair_comparisons {
            warn!(
                before = before_scope.len(),
                after = after_scope.len(),
                limit = self.config.max_pair_comparisons,
                "Body pair over comparison budget, exact matching only"
            );
            state.degraded = true;
            state.exact_pass(&before_scope, &after_scope);
        } else {
            state.run_passes(&before_scope, &after_scope);
            if state.degraded {
                warn!(
                    budget_ms = self.config.time_budget_ms,
                    "Body mapping hit time budget, keeping partial result"
                );
            }
        }

        let unmatched_before = before_scope
            .iter()
            .copied()
            .filter(|&id| !state.is_mapped_before(id))
            .collect();
        let unmatched_after = after_scope
            .iter()
            .copied()
            .filter(|&id| !state.is_mapped_after(id))
            .collect();

        debug!(
            edges = state.edges.len(),
            comparisons = state.comparisons(),
            "Body mapping finished"
        );

        let mut edges = std::mem::take(&mut state.edges);
        edges.sort_by(|x, y| x.before.cmp(&y.before).then(x.after.cmp(&y.after)));

        let mapping = BodyMapping {
            before: request.before_op,
            after: request.after_op,
            edges,
            unmatched_before,
            unmatched_after,
            before_scope: before_scope.len(),
            after_scope: after_scope.len(),
            degraded: state.degraded,
            parent: None,
        };
        debug_assert!(mapping.is_bijective(), "mapper produced a non-injective edge set");
        mapping
    }

    /// Extra mapper instances for exact duplicates the primary run left over
    ///
    /// When one statement has several identical counterparts, the primary
    /// mapping keeps the closest; each spawned instance takes the next one.
    /// At most `duplicate_candidate_limit - 1` instances are produced, each
    /// one-to-one on its own.
    pub fn spawn_duplicates(&self, request: &MappingRequest<'_, '_>, primary: &BodyMapping) -> Vec<BodyMapping> {
        let extra = self.config.duplicate_candidate_limit.saturating_sub(1);
        if extra == 0 {
            return Vec::new();
        }
        let (before_scope, after_scope) = request.resolved_scopes();
        let mapped_before = primary.mapped_before();
        let mapped_after = primary.mapped_after();

        let exact: Vec<&MappingEdge> = primary
            .edges
            .iter()
            .filter(|e| e.is_exact() && !request.before.node(e.before.statement).is_composite())
            .collect();

        let mut spawned = Vec::new();
        for k in 0..extra {
            let mut used_before = FxHashSet::default();
            let mut used_after = FxHashSet::default();
            let mut edges = Vec::new();
            for edge in &exact {
                let b = edge.before.statement;
                let a = edge.after.statement;
                let text = request.before.node(b).text.as_str();
                let after_alts = leftover_duplicates(request.after, &after_scope, &mapped_after, text);
                if let Some(&alt) = after_alts.get(k) {
                    if used_before.insert(b) && used_after.insert(alt) {
                        edges.push(exact_edge(b, alt));
                    }
                }
                let before_alts = leftover_duplicates(request.before, &before_scope, &mapped_before, text);
                if let Some(&alt) = before_alts.get(k) {
                    if used_before.insert(alt) && used_after.insert(a) {
                        edges.push(exact_edge(alt, a));
                    }
                }
            }
            if edges.is_empty() {
                break;
            }
            edges.sort_by(|x, y| x.before.cmp(&y.before).then(x.after.cmp(&y.after)));
            let mapped_b: FxHashSet<StatementId> = edges.iter().map(|e| e.before.statement).collect();
            let mapped_a: FxHashSet<StatementId> = edges.iter().map(|e| e.after.statement).collect();
            spawned.push(BodyMapping {
                before: request.before_op,
                after: request.after_op,
                edges,
                unmatched_before: before_scope.iter().copied().filter(|id| !mapped_b.contains(id)).collect(),
                unmatched_after: after_scope.iter().copied().filter(|id| !mapped_a.contains(id)).collect(),
                before_scope: before_scope.len(),
                after_scope: after_scope.len(),
                degraded: primary.degraded,
                parent: primary.parent,
            });
        }
        spawned
    }
}

/// Unmapped leaves in scope with the given canonical text
fn leftover_duplicates(
    tree: &FragmentTree<'_>,
    scope: &[StatementId],
    mapped: &FxHashSet<StatementId>,
    text: &str,
) -> Vec<StatementId> {
    scope
        .iter()
        .copied()
        .filter(|id| !mapped.contains(id))
        .filter(|&id| {
            let node = tree.node(id);
            !node.is_composite() && node.text == text
        })
        .collect()
}

fn exact_edge(before: StatementId, after: StatementId) -> MappingEdge {
    MappingEdge {
        before: Fragment::statement(before),
        after: Fragment::statement(after),
        pass: MatchPass::Exact,
        distance: 0.0,
        replacements: Vec::new(),
    }
}
