//! Mapping edges and mapper results

use crate::features::replacement::{Replacement, ReplacementKind};
use crate::shared::models::OperationRef;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Pre-order index of a statement inside one operation body
pub type StatementId = u32;

/// Pass that produced an edge; earlier passes are stronger evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPass {
    Exact,
    Leaf,
    Structural,
    Replacement,
}

/// A statement, or one expression inside it (pre-order index among the
/// statement's expression descendants)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fragment {
    pub statement: StatementId,
    pub expression: Option<u32>,
}

impl Fragment {
    pub fn statement(id: StatementId) -> Self {
        Self {
            statement: id,
            expression: None,
        }
    }

    pub fn expression(id: StatementId, index: u32) -> Self {
        Self {
            statement: id,
            expression: Some(index),
        }
    }
}

/// One recorded correspondence between a before and an after fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingEdge {
    pub before: Fragment,
    pub after: Fragment,
    pub pass: MatchPass,
    /// 0.0 for identical text, up to 1.0
    pub distance: f64,
    pub replacements: Vec<Replacement>,
}

impl MappingEdge {
    pub fn is_exact(&self) -> bool {
        self.pass == MatchPass::Exact && self.replacements.is_empty()
    }

    pub fn has_replacement(&self, kind: ReplacementKind) -> bool {
        self.replacements.iter().any(|r| r.kind == kind)
    }
}

/// Output of one mapper instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyMapping {
    pub before: OperationRef,
    pub after: OperationRef,
    pub edges: Vec<MappingEdge>,
    pub unmatched_before: Vec<StatementId>,
    pub unmatched_after: Vec<StatementId>,
    /// Statements considered on each side
    pub before_scope: usize,
    pub after_scope: usize,
    /// Budget exhausted; only the finished passes contributed
    pub degraded: bool,
    /// Enclosing mapper for nested extract/inline chains
    pub parent: Option<super::MapperId>,
}

impl BodyMapping {
    pub fn empty(before: OperationRef, after: OperationRef) -> Self {
        Self {
            before,
            after,
            edges: Vec::new(),
            unmatched_before: Vec::new(),
            unmatched_after: Vec::new(),
            before_scope: 0,
            after_scope: 0,
            degraded: false,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: super::MapperId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Distinct before statements that received an edge
    pub fn mapped_before(&self) -> FxHashSet<StatementId> {
        self.edges.iter().map(|e| e.before.statement).collect()
    }

    /// Distinct after statements that received an edge
    pub fn mapped_after(&self) -> FxHashSet<StatementId> {
        self.edges.iter().map(|e| e.after.statement).collect()
    }

    pub fn mapped_count(&self) -> usize {
        self.mapped_before().len()
    }

    pub fn exact_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_exact()).count()
    }

    /// Fraction of before statements mapped
    pub fn coverage(&self) -> f64 {
        if self.before_scope == 0 {
            return 0.0;
        }
        self.mapped_count() as f64 / self.before_scope as f64
    }

    /// Fraction of after statements mapped
    pub fn after_coverage(&self) -> f64 {
        if self.after_scope == 0 {
            return 0.0;
        }
        self.mapped_after().len() as f64 / self.after_scope as f64
    }

    /// No fragment appears in more than one edge on either side
    pub fn is_bijective(&self) -> bool {
        let mut seen_before = FxHashSet::default();
        let mut seen_after = FxHashSet::default();
        self.edges
            .iter()
            .all(|e| seen_before.insert(e.before) && seen_after.insert(e.after))
    }

    pub fn edge_for_before(&self, id: StatementId) -> Option<&MappingEdge> {
        self.edges.iter().find(|e| e.before.statement == id)
    }

    pub fn replacements(&self) -> impl Iterator<Item = &Replacement> {
        self.edges.iter().flat_map(|e| e.replacements.iter())
    }

    /// Drop the edges of the given before statements and return both ends
    /// to the residual lists (ends still cited by another edge stay mapped)
    pub fn unmap_before(&mut self, ids: &FxHashSet<StatementId>) {
        self.release(|e| ids.contains(&e.before.statement));
    }

    /// After-side counterpart of `unmap_before`
    pub fn unmap_after(&mut self, ids: &FxHashSet<StatementId>) {
        self.release(|e| ids.contains(&e.after.statement));
    }

    fn release(&mut self, released_if: impl Fn(&MappingEdge) -> bool) {
        let (released, kept): (Vec<MappingEdge>, Vec<MappingEdge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| released_if(e));
        self.edges = kept;
        let still_before = self.mapped_before();
        let still_after = self.mapped_after();
        for edge in released {
            let (b, a) = (edge.before.statement, edge.after.statement);
            if !still_before.contains(&b) && !self.unmatched_before.contains(&b) {
                self.unmatched_before.push(b);
            }
            if !still_after.contains(&a) && !self.unmatched_after.contains(&a) {
                self.unmatched_after.push(a);
            }
        }
        self.unmatched_before.sort_unstable();
        self.unmatched_after.sort_unstable();
    }

    /// Mapped statements exceed unmapped ones on both sides, or the before
    /// side is fully mapped and covers at least half of the after side
    pub fn mapped_exceeds_unmapped(&self) -> bool {
        let mapped = self.mapped_count();
        let nm_before = self.unmatched_before.len();
        let nm_after = self.unmatched_after.len();
        mapped > 0
            && ((mapped > nm_before && mapped > nm_after)
                || (nm_before == 0 && mapped > nm_after / 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::TypeRef;

    fn op(i: usize) -> OperationRef {
        OperationRef::new(TypeRef(0), i)
    }

    fn edge(b: StatementId, a: StatementId) -> MappingEdge {
        MappingEdge {
            before: Fragment::statement(b),
            after: Fragment::statement(a),
            pass: MatchPass::Exact,
            distance: 0.0,
            replacements: vec![],
        }
    }

    #[test]
    fn test_coverage_and_bijection() {
        let mut m = BodyMapping::empty(op(0), op(1));
        m.before_scope = 4;
        m.after_scope = 2;
        m.edges = vec![edge(0, 0), edge(2, 1)];
        m.unmatched_before = vec![1, 3];
        assert_eq!(m.coverage(), 0.5);
        assert_eq!(m.after_coverage(), 1.0);
        assert!(m.is_bijective());
        assert!(m.mapped_exceeds_unmapped() == false);

        m.edges.push(edge(2, 0));
        assert!(!m.is_bijective());
    }

    #[test]
    fn test_expression_fragments_are_distinct() {
        let mut m = BodyMapping::empty(op(0), op(1));
        let mut e1 = edge(0, 3);
        e1.after = Fragment::expression(3, 0);
        let mut e2 = edge(1, 3);
        e2.after = Fragment::expression(3, 2);
        m.edges = vec![e1, e2];
        assert!(m.is_bijective());
        assert_eq!(m.mapped_after().len(), 1);
    }

    #[test]
    fn test_unmap_before_returns_both_ends() {
        let mut m = BodyMapping::empty(op(0), op(1));
        m.edges = vec![edge(0, 0), edge(1, 2)];
        m.unmatched_before = vec![2];
        m.unmatched_after = vec![1];
        let ids: FxHashSet<StatementId> = [0].into_iter().collect();
        m.unmap_before(&ids);
        assert_eq!(m.edges.len(), 1);
        assert_eq!(m.unmatched_before, vec![0, 2]);
        assert_eq!(m.unmatched_after, vec![0, 1]);

        let ids: FxHashSet<StatementId> = [2].into_iter().collect();
        m.unmap_after(&ids);
        assert!(m.edges.is_empty());
        assert_eq!(m.unmatched_before, vec![0, 1, 2]);
        assert_eq!(m.unmatched_after, vec![0, 1, 2]);
    }
}
