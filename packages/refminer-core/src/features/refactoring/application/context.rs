//! Per-run classifier context

use crate::config::ClassifierConfig;
use crate::features::body_mapper::{BodyMapper, MapperId};
use crate::features::model_diff::{ModelDiff, OperationMatch};
use crate::shared::models::{Model, TypeRef};

/// How the owner of a moved member relates to its source type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRelation {
    /// Source and target are the same matched type
    Same,
    /// Target is the source's superclass
    Superclass,
    /// Target is a subclass of the source
    Subclass,
    Unrelated,
}

/// Everything a classifier reads; borrowed for one detection run
pub struct DetectionContext<'a> {
    pub before: &'a Model,
    pub after: &'a Model,
    pub diff: &'a ModelDiff,
    pub config: &'a ClassifierConfig,
    pub mapper: &'a BodyMapper,
}

impl<'a> DetectionContext<'a> {
    pub fn new(
        before: &'a Model,
        after: &'a Model,
        diff: &'a ModelDiff,
        config: &'a ClassifierConfig,
        mapper: &'a BodyMapper,
    ) -> Self {
        Self {
            before,
            after,
            diff,
            config,
            mapper,
        }
    }

    /// Operation matches that carry a body mapping, in diff order
    pub fn mapped_matches(&self) -> impl Iterator<Item = (&'a OperationMatch, MapperId)> {
        self.diff
            .operation_matches
            .iter()
            .filter_map(|m| m.mapper.map(|id| (m, id)))
    }

    pub fn relation(&self, before_owner: TypeRef, after_owner: TypeRef) -> OwnerRelation {
        let counterpart = self.diff.after_type_of(before_owner);
        if counterpart == Some(after_owner) {
            return OwnerRelation::Same;
        }
        let target_name = self.after.type_decl(after_owner).name.as_str();
        let source_extends_target = match counterpart {
            Some(c) => self.after.is_subtype_of(c, target_name),
            None => self.before.is_subtype_of(before_owner, target_name),
        };
        if source_extends_target {
            return OwnerRelation::Superclass;
        }
        let source_name = match counterpart {
            Some(c) => self.after.type_decl(c).name.as_str(),
            None => self.before.type_decl(before_owner).name.as_str(),
        };
        if self.after.is_subtype_of(after_owner, source_name) {
            return OwnerRelation::Subclass;
        }
        OwnerRelation::Unrelated
    }
}
