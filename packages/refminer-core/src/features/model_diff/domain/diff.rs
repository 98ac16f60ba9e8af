//! Declaration diff results

use crate::features::body_mapper::{BodyMapping, MapperArena, MapperId};
use crate::shared::models::{AttributeRef, OperationRef, TypeRef};
use serde::Serialize;
use std::collections::BTreeMap;

/// Old file path → new file path, as reported by version control
pub type RenameHints = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeMatchKind {
    /// Same fully-qualified name
    Same,
    Moved,
    Renamed,
    MovedAndRenamed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMatch {
    pub before: TypeRef,
    pub after: TypeRef,
    pub kind: TypeMatchKind,
    /// Member signature overlap (1.0 for same-name pairs)
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationMatchKind {
    /// Identical name and parameter types
    Signature,
    /// Accepted on speculative body-mapping evidence
    Body,
    /// Name-similarity fallback (too many candidates, or bodiless operations)
    Name,
    /// Leftover operations paired across different owners
    CrossType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationMatch {
    pub before: OperationRef,
    pub after: OperationRef,
    pub kind: OperationMatchKind,
    /// Body mapping for the pair; absent for bodiless pairs and cancelled runs
    pub mapper: Option<MapperId>,
    /// Weighted name/parameter/body score
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeMatchKind {
    Name,
    Renamed,
    CrossType,
    /// Different owner and a different name
    MovedAndRenamed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeMatch {
    pub before: AttributeRef,
    pub after: AttributeRef,
    pub kind: AttributeMatchKind,
}

/// Common, moved, added and removed declarations at every granularity
#[derive(Debug, Clone, Default)]
pub struct ModelDiff {
    pub type_matches: Vec<TypeMatch>,
    pub removed_types: Vec<TypeRef>,
    pub added_types: Vec<TypeRef>,
    pub operation_matches: Vec<OperationMatch>,
    pub removed_operations: Vec<OperationRef>,
    pub added_operations: Vec<OperationRef>,
    pub attribute_matches: Vec<AttributeMatch>,
    pub removed_attributes: Vec<AttributeRef>,
    pub added_attributes: Vec<AttributeRef>,
    pub mappers: MapperArena,
    /// The cancellation token fired while matching
    pub cancelled: bool,
}

impl ModelDiff {
    pub fn common_types(&self) -> impl Iterator<Item = &TypeMatch> {
        self.type_matches
            .iter()
            .filter(|m| m.kind == TypeMatchKind::Same)
    }

    pub fn moved_types(&self) -> impl Iterator<Item = &TypeMatch> {
        self.type_matches
            .iter()
            .filter(|m| m.kind != TypeMatchKind::Same)
    }

    pub fn after_type_of(&self, before: TypeRef) -> Option<TypeRef> {
        self.type_matches
            .iter()
            .find(|m| m.before == before)
            .map(|m| m.after)
    }

    pub fn match_for_before(&self, op: OperationRef) -> Option<&OperationMatch> {
        self.operation_matches.iter().find(|m| m.before == op)
    }

    pub fn match_for_after(&self, op: OperationRef) -> Option<&OperationMatch> {
        self.operation_matches.iter().find(|m| m.after == op)
    }

    pub fn mapping(&self, id: MapperId) -> Option<&BodyMapping> {
        self.mappers.get(id)
    }

    /// Mapper runs that hit a budget and kept a partial result
    pub fn degraded_mappings(&self) -> usize {
        self.mappers.iter().filter(|(_, m)| m.degraded).count()
    }
}
