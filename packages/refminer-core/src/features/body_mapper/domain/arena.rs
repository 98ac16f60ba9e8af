//! Arena of mapper results
//!
//! Nested extract/inline chains point to their enclosing mapper by index,
//! never by reference.

use super::mapping::BodyMapping;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MapperId(pub u32);

impl MapperId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapperArena {
    mappings: Vec<BodyMapping>,
}

impl MapperArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mapping: BodyMapping) -> MapperId {
        let id = MapperId(self.mappings.len() as u32);
        self.mappings.push(mapping);
        id
    }

    pub fn get(&self, id: MapperId) -> Option<&BodyMapping> {
        self.mappings.get(id.index())
    }

    pub fn get_mut(&mut self, id: MapperId) -> Option<&mut BodyMapping> {
        self.mappings.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MapperId, &BodyMapping)> {
        self.mappings
            .iter()
            .enumerate()
            .map(|(i, m)| (MapperId(i as u32), m))
    }

    pub fn children_of(&self, parent: MapperId) -> Vec<MapperId> {
        self.iter()
            .filter(|(_, m)| m.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of parent links above `id`
    pub fn depth(&self, id: MapperId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(|m| m.parent);
        while let Some(p) = current {
            depth += 1;
            current = self.get(p).and_then(|m| m.parent);
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{OperationRef, TypeRef};

    #[test]
    fn test_parent_chain() {
        let op = OperationRef::new(TypeRef(0), 0);
        let mut arena = MapperArena::new();
        let root = arena.push(BodyMapping::empty(op, op));
        let child = arena.push(BodyMapping::empty(op, op).with_parent(root));
        let grandchild = arena.push(BodyMapping::empty(op, op).with_parent(child));

        assert_eq!(arena.depth(root), 0);
        assert_eq!(arena.depth(grandchild), 2);
        assert_eq!(arena.children_of(root), vec![child]);
        assert!(arena.get(MapperId(9)).is_none());
    }
}
