//! Mapper passes over one pair of fragment trees
//!
//! All passes share one `MapperState`; a fragment mapped by an earlier pass is
//! never reconsidered. Structural matches recurse by running the whole pass
//! sequence again on the aligned branch scopes.

use crate::config::MapperConfig;
use crate::features::body_mapper::domain::{Fragment, MappingEdge, MatchPass, StatementId};
use crate::features::body_mapper::infrastructure::fragments::{FragmentNode, FragmentTree};
use crate::features::replacement::{Comparison, Replacement, ReplacementClassifier, ReplacementKind};
use crate::shared::models::StatementKind;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::time::Instant;

const OUT_OF_SCOPE: u32 = u32::MAX;

/// How often the replacement pass looks at the clock
const DEADLINE_CHECK_INTERVAL: usize = 256;

pub(super) struct MapperState<'s, 'a> {
    config: &'s MapperConfig,
    classifier: &'s ReplacementClassifier,
    before: &'s FragmentTree<'a>,
    after: &'s FragmentTree<'a>,
    rank_before: Vec<u32>,
    rank_after: Vec<u32>,
    min_depth_before: u32,
    min_depth_after: u32,
    partner_before: Vec<Option<StatementId>>,
    partner_after: Vec<Option<StatementId>>,
    /// Mapped only through one of its expressions; may host more
    leaf_host_before: Vec<bool>,
    leaf_host_after: Vec<bool>,
    used_before_expr: FxHashSet<(StatementId, u32)>,
    used_after_expr: FxHashSet<(StatementId, u32)>,
    pub(super) edges: Vec<MappingEdge>,
    deadline: Option<Instant>,
    comparisons: usize,
    pub(super) degraded: bool,
}

struct ReplacementCandidate {
    before: StatementId,
    after: StatementId,
    comparison: Comparison,
    same_shape: bool,
    distance: u32,
}

impl<'s, 'a> MapperState<'s, 'a> {
    pub(super) fn new(
        config: &'s MapperConfig,
        classifier: &'s ReplacementClassifier,
        before: &'s FragmentTree<'a>,
        after: &'s FragmentTree<'a>,
        before_scope: &[StatementId],
        after_scope: &[StatementId],
        deadline: Option<Instant>,
    ) -> Self {
        let anchors = unique_leaf_pairs(before, before_scope, after, after_scope);
        Self {
            config,
            classifier,
            before,
            after,
            rank_before: ranks(before, before_scope, &anchors.0),
            rank_after: ranks(after, after_scope, &anchors.1),
            min_depth_before: min_depth(before, before_scope),
            min_depth_after: min_depth(after, after_scope),
            partner_before: vec![None; before.len()],
            partner_after: vec![None; after.len()],
            leaf_host_before: vec![false; before.len()],
            leaf_host_after: vec![false; after.len()],
            used_before_expr: FxHashSet::default(),
            used_after_expr: FxHashSet::default(),
            edges: Vec::new(),
            deadline,
            comparisons: 0,
            degraded: false,
        }
    }

    pub(super) fn is_mapped_before(&self, id: StatementId) -> bool {
        self.partner_before[id as usize].is_some()
    }

    pub(super) fn is_mapped_after(&self, id: StatementId) -> bool {
        self.partner_after[id as usize].is_some()
    }

    pub(super) fn comparisons(&self) -> usize {
        self.comparisons
    }

    fn out_of_time(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Passes 1-4 over one scope pair
    pub(super) fn run_passes(&mut self, before_ids: &[StatementId], after_ids: &[StatementId]) {
        if before_ids.is_empty() || after_ids.is_empty() {
            return;
        }
        self.exact_pass(before_ids, after_ids);
        if self.out_of_time() {
            self.degraded = true;
            return;
        }
        self.leaf_pass(before_ids, after_ids);
        self.structural_pass(before_ids, after_ids);
        if self.degraded || self.out_of_time() {
            self.degraded = true;
            return;
        }
        self.replacement_pass(before_ids, after_ids);
    }

    // ------------------------------------------------------------------
    // Pass 1: exact text
    // ------------------------------------------------------------------

    pub(super) fn exact_pass(&mut self, before_ids: &[StatementId], after_ids: &[StatementId]) {
        let (before, after) = (self.before, self.after);
        let mut by_subtree: FxHashMap<&str, Vec<StatementId>> = FxHashMap::default();
        let mut by_text: FxHashMap<&str, Vec<StatementId>> = FxHashMap::default();
        for &a in after_ids {
            if self.is_mapped_after(a) {
                continue;
            }
            let node = after.node(a);
            if node.is_composite() {
                by_subtree.entry(node.subtree_text.as_str()).or_default().push(a);
            } else {
                by_text.entry(node.text.as_str()).or_default().push(a);
            }
        }

        // Whole identical subtrees first, outermost first
        for &b in before_ids {
            let node = before.node(b);
            if !node.is_composite() || !self.subtree_free_before(b) {
                continue;
            }
            let Some(candidates) = by_subtree.get(node.subtree_text.as_str()) else {
                continue;
            };
            let best = candidates
                .iter()
                .copied()
                .filter(|&a| self.subtree_free_after(a))
                .min_by_key(|&a| self.exact_rank(b, a));
            if let Some(a) = best {
                let size = node.subtree_end - b;
                for k in 0..size {
                    self.add_edge(
                        Fragment::statement(b + k),
                        Fragment::statement(a + k),
                        MatchPass::Exact,
                        0.0,
                        Vec::new(),
                    );
                }
            }
        }

        for &b in before_ids {
            let node = before.node(b);
            if node.is_composite() || self.is_mapped_before(b) {
                continue;
            }
            let Some(candidates) = by_text.get(node.text.as_str()) else {
                continue;
            };
            let best = candidates
                .iter()
                .copied()
                .filter(|&a| !self.is_mapped_after(a))
                .min_by_key(|&a| self.exact_rank(b, a));
            if let Some(a) = best {
                self.add_edge(
                    Fragment::statement(b),
                    Fragment::statement(a),
                    MatchPass::Exact,
                    0.0,
                    Vec::new(),
                );
            }
        }
    }

    /// Lower is better: same relative depth, consistent parent, closest position
    fn exact_rank(&self, b: StatementId, a: StatementId) -> (bool, bool, u32, StatementId) {
        let bn = self.before.node(b);
        let an = self.after.node(a);
        let depth_differs =
            bn.depth.saturating_sub(self.min_depth_before) != an.depth.saturating_sub(self.min_depth_after);
        (depth_differs, !self.parent_consistent(bn, an), self.rank_distance(b, a), a)
    }

    fn parent_consistent(&self, bn: &FragmentNode<'_>, an: &FragmentNode<'_>) -> bool {
        let bp = bn.parent.filter(|&p| self.rank_before[p as usize] != OUT_OF_SCOPE);
        let ap = an.parent.filter(|&p| self.rank_after[p as usize] != OUT_OF_SCOPE);
        match (bp, ap) {
            (Some(bp), Some(ap)) => self.partner_before[bp as usize] == Some(ap),
            (None, None) => true,
            _ => false,
        }
    }

    fn rank_distance(&self, b: StatementId, a: StatementId) -> u32 {
        self.rank_before[b as usize].abs_diff(self.rank_after[a as usize])
    }

    fn subtree_free_before(&self, b: StatementId) -> bool {
        (b..self.before.node(b).subtree_end)
            .all(|x| self.rank_before[x as usize] != OUT_OF_SCOPE && !self.is_mapped_before(x))
    }

    fn subtree_free_after(&self, a: StatementId) -> bool {
        (a..self.after.node(a).subtree_end)
            .all(|x| self.rank_after[x as usize] != OUT_OF_SCOPE && !self.is_mapped_after(x))
    }

    // ------------------------------------------------------------------
    // Pass 2: call expressions moved into another statement kind
    // ------------------------------------------------------------------

    /// Hosts must differ in statement kind from the source; same-kind pairs
    /// go to the replacement pass so renames around a call stay visible
    pub(super) fn leaf_pass(&mut self, before_ids: &[StatementId], after_ids: &[StatementId]) {
        let (before, after) = (self.before, self.after);
        for &b in before_ids {
            let bn = before.node(b);
            if bn.is_composite() || self.is_mapped_before(b) {
                continue;
            }
            let Some(core) = bn.core_call() else {
                continue;
            };
            let mut best: Option<(u32, StatementId, u32)> = None;
            for &a in after_ids {
                let an = after.node(a);
                if an.is_composite()
                    || an.statement.kind == bn.statement.kind
                    || (self.is_mapped_after(a) && !self.leaf_host_after[a as usize])
                {
                    continue;
                }
                for frag in &an.expressions {
                    if frag.is_call
                        && frag.text == core.text
                        && !self.used_after_expr.contains(&(a, frag.index))
                    {
                        let key = (self.rank_distance(b, a), a, frag.index);
                        if best.map(|cur| key < cur).unwrap_or(true) {
                            best = Some(key);
                        }
                    }
                }
            }
            if let Some((_, a, index)) = best {
                let an = after.node(a);
                let similarity = self.classifier.compare(&bn.tokens, &an.tokens).similarity;
                let replacement =
                    Replacement::new(ReplacementKind::ExpressionWrapped, bn.text.clone(), an.text.clone());
                self.used_after_expr.insert((a, index));
                self.leaf_host_after[a as usize] = true;
                self.add_edge(
                    Fragment::statement(b),
                    Fragment::expression(a, index),
                    MatchPass::Leaf,
                    1.0 - similarity,
                    vec![replacement],
                );
            }
        }

        for &a in after_ids {
            let an = after.node(a);
            if an.is_composite() || self.is_mapped_after(a) {
                continue;
            }
            let Some(core) = an.core_call() else {
                continue;
            };
            let mut best: Option<(u32, StatementId, u32)> = None;
            for &b in before_ids {
                let bn = before.node(b);
                if bn.is_composite()
                    || bn.statement.kind == an.statement.kind
                    || (self.is_mapped_before(b) && !self.leaf_host_before[b as usize])
                {
                    continue;
                }
                for frag in &bn.expressions {
                    if frag.is_call
                        && frag.text == core.text
                        && !self.used_before_expr.contains(&(b, frag.index))
                    {
                        let key = (self.rank_distance(b, a), b, frag.index);
                        if best.map(|cur| key < cur).unwrap_or(true) {
                            best = Some(key);
                        }
                    }
                }
            }
            if let Some((_, b, index)) = best {
                let bn = before.node(b);
                let similarity = self.classifier.compare(&bn.tokens, &an.tokens).similarity;
                let replacement =
                    Replacement::new(ReplacementKind::ExpressionWrapped, bn.text.clone(), an.text.clone());
                self.used_before_expr.insert((b, index));
                self.leaf_host_before[b as usize] = true;
                self.add_edge(
                    Fragment::expression(b, index),
                    Fragment::statement(a),
                    MatchPass::Leaf,
                    1.0 - similarity,
                    vec![replacement],
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Pass 3: composites by kind and condition, recursing into branches
    // ------------------------------------------------------------------

    pub(super) fn structural_pass(&mut self, before_ids: &[StatementId], after_ids: &[StatementId]) {
        let (before, after) = (self.before, self.after);
        for &b in before_ids {
            if self.degraded {
                return;
            }
            let bn = before.node(b);
            if !bn.is_composite() || self.is_mapped_before(b) {
                continue;
            }
            if self.out_of_time() {
                self.degraded = true;
                return;
            }

            let mut best: Option<(StructuralScore, StatementId, Comparison)> = None;
            for &a in after_ids {
                let an = after.node(a);
                if !an.is_composite() || self.is_mapped_after(a) || an.statement.kind != bn.statement.kind {
                    continue;
                }
                let header = self.classifier.compare(&bn.tokens, &an.tokens);
                let identical = header.is_identical();
                if bn.statement.kind.has_condition() && !identical && !single_fine_replacement(&header) {
                    continue;
                }
                let child_score = self.child_score(b, a);
                let both_empty = bn.descendant_count() == 0 && an.descendant_count() == 0;
                if !identical
                    && child_score <= 0.0
                    && header.similarity < self.config.similarity_floor
                    && !both_empty
                {
                    continue;
                }
                let score = StructuralScore {
                    child_score,
                    identical,
                    header_similarity: header.similarity,
                    distance: self.rank_distance(b, a),
                };
                let better = match &best {
                    None => true,
                    Some((current, _, _)) => score.better_than(current),
                };
                if better {
                    best = Some((score, a, header));
                }
            }

            if let Some((_, a, header)) = best {
                self.add_edge(
                    Fragment::statement(b),
                    Fragment::statement(a),
                    MatchPass::Structural,
                    1.0 - header.similarity,
                    header.replacements,
                );
                self.map_branches(b, a);
            }
        }
    }

    /// Fraction of descendants already mapped inside the candidate's subtree
    fn child_score(&self, b: StatementId, a: StatementId) -> f64 {
        let bn = self.before.node(b);
        let an = self.after.node(a);
        let denom = bn.descendant_count().max(an.descendant_count());
        if denom == 0 {
            return 0.0;
        }
        let inside = bn
            .descendants()
            .filter(|&x| {
                self.partner_before[x as usize]
                    .map(|y| self.after.is_ancestor(a, y))
                    .unwrap_or(false)
            })
            .count();
        inside as f64 / denom as f64
    }

    /// Align branches by kind (and header for catch/case), map each aligned
    /// pair, then pool whatever is left on both sides
    fn map_branches(&mut self, b: StatementId, a: StatementId) {
        let before_tree = self.before;
        let after_tree = self.after;
        let before_branches = &before_tree.node(b).statement.branches;
        let after_branches = &after_tree.node(a).statement.branches;

        let mut used = vec![false; after_branches.len()];
        let mut aligned: Vec<(usize, Option<usize>)> = Vec::with_capacity(before_branches.len());
        for (bi, branch) in before_branches.iter().enumerate() {
            let by_header = after_branches
                .iter()
                .enumerate()
                .position(|(ai, ab)| !used[ai] && ab.kind == branch.kind && ab.header == branch.header);
            let by_kind = || {
                after_branches
                    .iter()
                    .enumerate()
                    .position(|(ai, ab)| !used[ai] && ab.kind == branch.kind)
            };
            let matched = by_header.or_else(by_kind);
            if let Some(ai) = matched {
                used[ai] = true;
            }
            aligned.push((bi, matched));
        }

        for &(bi, ai) in &aligned {
            let Some(ai) = ai else { continue };
            let bs = self.free_before(before_tree.branch_ids(b, bi));
            let as_ = self.free_after(after_tree.branch_ids(a, ai));
            self.run_passes(&bs, &as_);
        }

        let leftover_before: Vec<StatementId> = self.free_before(before_tree.node(b).descendants().collect());
        let leftover_after: Vec<StatementId> = self.free_after(after_tree.node(a).descendants().collect());
        if !leftover_before.is_empty() && !leftover_after.is_empty() {
            self.run_passes(&leftover_before, &leftover_after);
        }
    }

    fn free_before(&self, ids: Vec<StatementId>) -> Vec<StatementId> {
        ids.into_iter()
            .filter(|&x| self.rank_before[x as usize] != OUT_OF_SCOPE && !self.is_mapped_before(x))
            .collect()
    }

    fn free_after(&self, ids: Vec<StatementId>) -> Vec<StatementId> {
        ids.into_iter()
            .filter(|&x| self.rank_after[x as usize] != OUT_OF_SCOPE && !self.is_mapped_after(x))
            .collect()
    }

    // ------------------------------------------------------------------
    // Pass 4: replacements above the similarity floor
    // ------------------------------------------------------------------

    pub(super) fn replacement_pass(&mut self, before_ids: &[StatementId], after_ids: &[StatementId]) {
        let (before, after) = (self.before, self.after);
        let mut candidates: Vec<ReplacementCandidate> = Vec::new();
        'outer: for &b in before_ids {
            if self.is_mapped_before(b) {
                continue;
            }
            let bn = before.node(b);
            for &a in after_ids {
                if self.is_mapped_after(a) {
                    continue;
                }
                let an = after.node(a);
                if !compatible_kinds(bn.statement.kind, an.statement.kind) {
                    continue;
                }
                self.comparisons += 1;
                if self.comparisons % DEADLINE_CHECK_INTERVAL == 0 && self.out_of_time() {
                    self.degraded = true;
                    break 'outer;
                }
                let comparison = self.classifier.compare(&bn.tokens, &an.tokens);
                if comparison.similarity < self.config.similarity_floor {
                    continue;
                }
                candidates.push(ReplacementCandidate {
                    before: b,
                    after: a,
                    same_shape: bn.statement.shape() == an.statement.shape(),
                    distance: self.rank_distance(b, a),
                    comparison,
                });
            }
        }

        candidates.sort_by(|x, y| {
            y.comparison
                .similarity
                .total_cmp(&x.comparison.similarity)
                .then(y.same_shape.cmp(&x.same_shape))
                .then(x.distance.cmp(&y.distance))
                .then(x.before.cmp(&y.before))
                .then(x.after.cmp(&y.after))
        });

        for c in candidates {
            if self.is_mapped_before(c.before) || self.is_mapped_after(c.after) {
                continue;
            }
            self.add_edge(
                Fragment::statement(c.before),
                Fragment::statement(c.after),
                MatchPass::Replacement,
                1.0 - c.comparison.similarity,
                c.comparison.replacements,
            );
        }
    }

    fn add_edge(
        &mut self,
        before: Fragment,
        after: Fragment,
        pass: MatchPass,
        distance: f64,
        replacements: Vec<Replacement>,
    ) {
        let (b, a) = (before.statement as usize, after.statement as usize);
        if self.partner_before[b].is_none() {
            self.partner_before[b] = Some(after.statement);
        }
        if self.partner_after[a].is_none() {
            self.partner_after[a] = Some(before.statement);
        }
        self.edges.push(MappingEdge {
            before,
            after,
            pass,
            distance: distance.max(0.0),
            replacements,
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct StructuralScore {
    child_score: f64,
    identical: bool,
    header_similarity: f64,
    distance: u32,
}

impl StructuralScore {
    fn better_than(&self, other: &Self) -> bool {
        let ord = self
            .child_score
            .total_cmp(&other.child_score)
            .then(self.identical.cmp(&other.identical))
            .then(self.header_similarity.total_cmp(&other.header_similarity))
            .then(other.distance.cmp(&self.distance));
        ord == Ordering::Greater
    }
}

fn single_fine_replacement(comparison: &Comparison) -> bool {
    comparison.replacements.len() == 1
        && comparison.replacements[0].kind != ReplacementKind::ExpressionReplaced
}

/// Leaves pair with leaves of the same kind, or across the value-carrying
/// kinds (`T v = e;` ↔ `v = e;` ↔ `return e;`); composites need the same kind
fn compatible_kinds(before: StatementKind, after: StatementKind) -> bool {
    if before == after {
        return true;
    }
    let value_kind = |k: StatementKind| {
        matches!(
            k,
            StatementKind::Expression
                | StatementKind::VariableDeclaration
                | StatementKind::Return
                | StatementKind::Throw
        )
    };
    value_kind(before) && value_kind(after)
}

/// Leaves whose text occurs exactly once in each scope, per side
fn unique_leaf_pairs(
    before: &FragmentTree<'_>,
    before_scope: &[StatementId],
    after: &FragmentTree<'_>,
    after_scope: &[StatementId],
) -> (FxHashSet<StatementId>, FxHashSet<StatementId>) {
    fn count<'t>(tree: &'t FragmentTree<'_>, scope: &[StatementId]) -> FxHashMap<&'t str, u32> {
        let mut counts: FxHashMap<&str, u32> = FxHashMap::default();
        for &id in scope {
            let node = tree.node(id);
            if !node.is_composite() {
                *counts.entry(node.text.as_str()).or_default() += 1;
            }
        }
        counts
    }
    let (before_counts, after_counts) = (count(before, before_scope), count(after, after_scope));
    let unique = |text: &str| before_counts.get(text) == Some(&1) && after_counts.get(text) == Some(&1);
    let pick = |tree: &FragmentTree<'_>, scope: &[StatementId]| -> FxHashSet<StatementId> {
        scope
            .iter()
            .copied()
            .filter(|&id| {
                let node = tree.node(id);
                !node.is_composite() && unique(node.text.as_str())
            })
            .collect()
    };
    (pick(before, before_scope), pick(after, after_scope))
}

/// Scope position of each node, counting only non-anchor statements
///
/// Anchors pair up exactly without any tie-break, so leaving them out keeps
/// every position distance unchanged when an identical pair is added on both
/// sides.
fn ranks(tree: &FragmentTree<'_>, scope: &[StatementId], anchors: &FxHashSet<StatementId>) -> Vec<u32> {
    let mut out = vec![OUT_OF_SCOPE; tree.len()];
    let mut rank = 0u32;
    for &id in scope {
        out[id as usize] = rank;
        if !anchors.contains(&id) {
            rank += 1;
        }
    }
    out
}

fn min_depth(tree: &FragmentTree<'_>, scope: &[StatementId]) -> u32 {
    scope.iter().map(|&id| tree.node(id).depth).min().unwrap_or(0)
}
