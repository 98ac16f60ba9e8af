//! Refactoring instances
//!
//! A closed sum type: every variant carries the declaration references and
//! mapper ids that justify it. Nothing here points into a model directly, so
//! a `Refactoring` stays valid for as long as both snapshots live.

use crate::features::body_mapper::MapperId;
use crate::shared::models::{Annotation, AttributeRef, OperationRef, Parameter, TypeRef, Visibility};
use serde::Serialize;
use std::fmt;

/// Matched declaration pair a modifier/annotation change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "element", rename_all = "lowercase")]
pub enum DeclarationPair {
    Type { before: TypeRef, after: TypeRef },
    Operation { before: OperationRef, after: OperationRef },
    Attribute { before: AttributeRef, after: AttributeRef },
}

/// Refactoring kinds in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RefactoringKind {
    ExtractOperation,
    ExtractAndMoveOperation,
    InlineOperation,
    MoveAndInlineOperation,
    MergeOperation,
    SplitOperation,
    ParameterizeTest,
    RenameOperation,
    MoveOperation,
    MoveAndRenameOperation,
    PullUpOperation,
    PushDownOperation,
    MoveCode,
    RenameClass,
    MoveClass,
    MoveAndRenameClass,
    ExtractSuperclass,
    ExtractInterface,
    RenameAttribute,
    MoveAttribute,
    MoveAndRenameAttribute,
    PullUpAttribute,
    PushDownAttribute,
    ChangeReturnType,
    AddParameter,
    RemoveParameter,
    RenameParameter,
    ReorderParameter,
    ChangeParameterType,
    AddThrownExceptionType,
    RemoveThrownExceptionType,
    ChangeAttributeType,
    ExtractVariable,
    InlineVariable,
    RenameVariable,
    ChangeVariableType,
    AddClassAnnotation,
    RemoveClassAnnotation,
    ModifyClassAnnotation,
    AddMethodAnnotation,
    RemoveMethodAnnotation,
    ModifyMethodAnnotation,
    AddAttributeAnnotation,
    RemoveAttributeAnnotation,
    ModifyAttributeAnnotation,
    ChangeClassAccessModifier,
    ChangeOperationAccessModifier,
    ChangeAttributeAccessModifier,
}

impl RefactoringKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ExtractOperation => "Extract Method",
            Self::ExtractAndMoveOperation => "Extract And Move Method",
            Self::InlineOperation => "Inline Method",
            Self::MoveAndInlineOperation => "Move And Inline Method",
            Self::MergeOperation => "Merge Method",
            Self::SplitOperation => "Split Method",
            Self::ParameterizeTest => "Parameterize Test",
            Self::RenameOperation => "Rename Method",
            Self::MoveOperation => "Move Method",
            Self::MoveAndRenameOperation => "Move And Rename Method",
            Self::PullUpOperation => "Pull Up Method",
            Self::PushDownOperation => "Push Down Method",
            Self::MoveCode => "Move Code",
            Self::RenameClass => "Rename Class",
            Self::MoveClass => "Move Class",
            Self::MoveAndRenameClass => "Move And Rename Class",
            Self::ExtractSuperclass => "Extract Superclass",
            Self::ExtractInterface => "Extract Interface",
            Self::RenameAttribute => "Rename Attribute",
            Self::MoveAttribute => "Move Attribute",
            Self::MoveAndRenameAttribute => "Move And Rename Attribute",
            Self::PullUpAttribute => "Pull Up Attribute",
            Self::PushDownAttribute => "Push Down Attribute",
            Self::ChangeReturnType => "Change Return Type",
            Self::AddParameter => "Add Parameter",
            Self::RemoveParameter => "Remove Parameter",
            Self::RenameParameter => "Rename Parameter",
            Self::ReorderParameter => "Reorder Parameter",
            Self::ChangeParameterType => "Change Parameter Type",
            Self::AddThrownExceptionType => "Add Thrown Exception Type",
            Self::RemoveThrownExceptionType => "Remove Thrown Exception Type",
            Self::ChangeAttributeType => "Change Attribute Type",
            Self::ExtractVariable => "Extract Variable",
            Self::InlineVariable => "Inline Variable",
            Self::RenameVariable => "Rename Variable",
            Self::ChangeVariableType => "Change Variable Type",
            Self::AddClassAnnotation => "Add Class Annotation",
            Self::RemoveClassAnnotation => "Remove Class Annotation",
            Self::ModifyClassAnnotation => "Modify Class Annotation",
            Self::AddMethodAnnotation => "Add Method Annotation",
            Self::RemoveMethodAnnotation => "Remove Method Annotation",
            Self::ModifyMethodAnnotation => "Modify Method Annotation",
            Self::AddAttributeAnnotation => "Add Attribute Annotation",
            Self::RemoveAttributeAnnotation => "Remove Attribute Annotation",
            Self::ModifyAttributeAnnotation => "Modify Attribute Annotation",
            Self::ChangeClassAccessModifier => "Change Class Access Modifier",
            Self::ChangeOperationAccessModifier => "Change Method Access Modifier",
            Self::ChangeAttributeAccessModifier => "Change Attribute Access Modifier",
        }
    }

    /// Merge-step priority; lower claims mapping edges first
    pub fn priority(&self) -> u8 {
        match self {
            Self::ExtractOperation | Self::ExtractAndMoveOperation => 0,
            Self::InlineOperation | Self::MoveAndInlineOperation => 1,
            Self::MergeOperation | Self::SplitOperation => 2,
            Self::ParameterizeTest => 3,
            Self::RenameOperation
            | Self::MoveOperation
            | Self::MoveAndRenameOperation
            | Self::PullUpOperation
            | Self::PushDownOperation => 4,
            Self::MoveCode => 5,
            _ => 6,
        }
    }
}

impl fmt::Display for RefactoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One detected refactoring
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Refactoring {
    RenameClass {
        before: TypeRef,
        after: TypeRef,
    },
    MoveClass {
        before: TypeRef,
        after: TypeRef,
    },
    MoveAndRenameClass {
        before: TypeRef,
        after: TypeRef,
    },
    /// `extracted` is new in the after snapshot and is now the superclass of
    /// the after counterparts of `from`
    ExtractSuperclass {
        extracted: TypeRef,
        from: Vec<TypeRef>,
    },
    ExtractInterface {
        extracted: TypeRef,
        from: Vec<TypeRef>,
    },

    RenameOperation {
        before: OperationRef,
        after: OperationRef,
        mapper: Option<MapperId>,
    },
    MoveOperation {
        before: OperationRef,
        after: OperationRef,
        mapper: Option<MapperId>,
    },
    MoveAndRenameOperation {
        before: OperationRef,
        after: OperationRef,
        mapper: Option<MapperId>,
    },
    PullUpOperation {
        before: OperationRef,
        after: OperationRef,
        mapper: Option<MapperId>,
    },
    PushDownOperation {
        before: OperationRef,
        after: OperationRef,
        mapper: Option<MapperId>,
    },
    /// `extracted` is new in the after snapshot and called from `source_after`
    ExtractOperation {
        source_before: OperationRef,
        source_after: OperationRef,
        extracted: OperationRef,
        mapper: MapperId,
    },
    ExtractAndMoveOperation {
        source_before: OperationRef,
        source_after: OperationRef,
        extracted: OperationRef,
        mapper: MapperId,
    },
    /// `inlined` existed only in the before snapshot and was called from `target_before`
    InlineOperation {
        inlined: OperationRef,
        target_before: OperationRef,
        target_after: OperationRef,
        mapper: MapperId,
    },
    MoveAndInlineOperation {
        inlined: OperationRef,
        target_before: OperationRef,
        target_after: OperationRef,
        mapper: MapperId,
    },
    MergeOperation {
        merged: Vec<OperationRef>,
        into: OperationRef,
        mappers: Vec<MapperId>,
    },
    SplitOperation {
        source: OperationRef,
        into: Vec<OperationRef>,
        mappers: Vec<MapperId>,
    },
    ParameterizeTest {
        tests: Vec<OperationRef>,
        into: OperationRef,
        parameters: Vec<String>,
        mappers: Vec<MapperId>,
    },
    /// Residual statements of one matched pair reappearing in another
    MoveCode {
        source_before: OperationRef,
        source_after: OperationRef,
        target_before: OperationRef,
        target_after: OperationRef,
        mapper: MapperId,
    },

    ChangeReturnType {
        before: OperationRef,
        after: OperationRef,
        from: String,
        to: String,
    },
    AddParameter {
        before: OperationRef,
        after: OperationRef,
        parameter: Parameter,
    },
    RemoveParameter {
        before: OperationRef,
        after: OperationRef,
        parameter: Parameter,
    },
    RenameParameter {
        before: OperationRef,
        after: OperationRef,
        from: Parameter,
        to: Parameter,
    },
    ReorderParameter {
        before: OperationRef,
        after: OperationRef,
    },
    ChangeParameterType {
        before: OperationRef,
        after: OperationRef,
        from: Parameter,
        to: Parameter,
    },
    AddThrownExceptionType {
        before: OperationRef,
        after: OperationRef,
        exception: String,
    },
    RemoveThrownExceptionType {
        before: OperationRef,
        after: OperationRef,
        exception: String,
    },

    RenameAttribute {
        before: AttributeRef,
        after: AttributeRef,
    },
    MoveAttribute {
        before: AttributeRef,
        after: AttributeRef,
    },
    MoveAndRenameAttribute {
        before: AttributeRef,
        after: AttributeRef,
    },
    PullUpAttribute {
        before: AttributeRef,
        after: AttributeRef,
    },
    PushDownAttribute {
        before: AttributeRef,
        after: AttributeRef,
    },
    ChangeAttributeType {
        before: AttributeRef,
        after: AttributeRef,
        from: String,
        to: String,
    },

    AddAnnotation {
        on: DeclarationPair,
        annotation: Annotation,
    },
    RemoveAnnotation {
        on: DeclarationPair,
        annotation: Annotation,
    },
    ModifyAnnotation {
        on: DeclarationPair,
        from: Annotation,
        to: Annotation,
    },
    ChangeAccessModifier {
        on: DeclarationPair,
        from: Visibility,
        to: Visibility,
    },

    /// New local `name` whose initializer replaced an expression in `after`
    ExtractVariable {
        before: OperationRef,
        after: OperationRef,
        name: String,
        type_name: String,
        initializer: String,
    },
    /// Local `name` of `before` whose initializer took its place in `after`
    InlineVariable {
        before: OperationRef,
        after: OperationRef,
        name: String,
        type_name: String,
        initializer: String,
    },
    RenameVariable {
        before: OperationRef,
        after: OperationRef,
        from: String,
        to: String,
    },
    ChangeVariableType {
        before: OperationRef,
        after: OperationRef,
        name: String,
        from: String,
        to: String,
    },
}

/// Identity of the explanation a refactoring gives for its mapping edges
///
/// Two candidates with the same group may cite the same fragment (duplicated
/// code at several call sites); different groups may not.
pub type ClaimGroup = (RefactoringKind, OperationRef, OperationRef);

impl Refactoring {
    pub fn kind(&self) -> RefactoringKind {
        use RefactoringKind as K;
        match self {
            Self::RenameClass { .. } => K::RenameClass,
            Self::MoveClass { .. } => K::MoveClass,
            Self::MoveAndRenameClass { .. } => K::MoveAndRenameClass,
            Self::ExtractSuperclass { .. } => K::ExtractSuperclass,
            Self::ExtractInterface { .. } => K::ExtractInterface,
            Self::RenameOperation { .. } => K::RenameOperation,
            Self::MoveOperation { .. } => K::MoveOperation,
            Self::MoveAndRenameOperation { .. } => K::MoveAndRenameOperation,
            Self::PullUpOperation { .. } => K::PullUpOperation,
            Self::PushDownOperation { .. } => K::PushDownOperation,
            Self::ExtractOperation { .. } => K::ExtractOperation,
            Self::ExtractAndMoveOperation { .. } => K::ExtractAndMoveOperation,
            Self::InlineOperation { .. } => K::InlineOperation,
            Self::MoveAndInlineOperation { .. } => K::MoveAndInlineOperation,
            Self::MergeOperation { .. } => K::MergeOperation,
            Self::SplitOperation { .. } => K::SplitOperation,
            Self::ParameterizeTest { .. } => K::ParameterizeTest,
            Self::MoveCode { .. } => K::MoveCode,
            Self::ChangeReturnType { .. } => K::ChangeReturnType,
            Self::AddParameter { .. } => K::AddParameter,
            Self::RemoveParameter { .. } => K::RemoveParameter,
            Self::RenameParameter { .. } => K::RenameParameter,
            Self::ReorderParameter { .. } => K::ReorderParameter,
            Self::ChangeParameterType { .. } => K::ChangeParameterType,
            Self::AddThrownExceptionType { .. } => K::AddThrownExceptionType,
            Self::RemoveThrownExceptionType { .. } => K::RemoveThrownExceptionType,
            Self::RenameAttribute { .. } => K::RenameAttribute,
            Self::MoveAttribute { .. } => K::MoveAttribute,
            Self::MoveAndRenameAttribute { .. } => K::MoveAndRenameAttribute,
            Self::PullUpAttribute { .. } => K::PullUpAttribute,
            Self::PushDownAttribute { .. } => K::PushDownAttribute,
            Self::ChangeAttributeType { .. } => K::ChangeAttributeType,
            Self::AddAnnotation { on, .. } => match on {
                DeclarationPair::Type { .. } => K::AddClassAnnotation,
                DeclarationPair::Operation { .. } => K::AddMethodAnnotation,
                DeclarationPair::Attribute { .. } => K::AddAttributeAnnotation,
            },
            Self::RemoveAnnotation { on, .. } => match on {
                DeclarationPair::Type { .. } => K::RemoveClassAnnotation,
                DeclarationPair::Operation { .. } => K::RemoveMethodAnnotation,
                DeclarationPair::Attribute { .. } => K::RemoveAttributeAnnotation,
            },
            Self::ModifyAnnotation { on, .. } => match on {
                DeclarationPair::Type { .. } => K::ModifyClassAnnotation,
                DeclarationPair::Operation { .. } => K::ModifyMethodAnnotation,
                DeclarationPair::Attribute { .. } => K::ModifyAttributeAnnotation,
            },
            Self::ChangeAccessModifier { on, .. } => match on {
                DeclarationPair::Type { .. } => K::ChangeClassAccessModifier,
                DeclarationPair::Operation { .. } => K::ChangeOperationAccessModifier,
                DeclarationPair::Attribute { .. } => K::ChangeAttributeAccessModifier,
            },
            Self::ExtractVariable { .. } => K::ExtractVariable,
            Self::InlineVariable { .. } => K::InlineVariable,
            Self::RenameVariable { .. } => K::RenameVariable,
            Self::ChangeVariableType { .. } => K::ChangeVariableType,
        }
    }

    /// Body mappings this refactoring is justified by
    pub fn cited_mappers(&self) -> Vec<MapperId> {
        match self {
            Self::RenameOperation { mapper, .. }
            | Self::MoveOperation { mapper, .. }
            | Self::MoveAndRenameOperation { mapper, .. }
            | Self::PullUpOperation { mapper, .. }
            | Self::PushDownOperation { mapper, .. } => mapper.iter().copied().collect(),
            Self::ExtractOperation { mapper, .. }
            | Self::ExtractAndMoveOperation { mapper, .. }
            | Self::InlineOperation { mapper, .. }
            | Self::MoveAndInlineOperation { mapper, .. }
            | Self::MoveCode { mapper, .. } => vec![*mapper],
            Self::MergeOperation { mappers, .. }
            | Self::SplitOperation { mappers, .. }
            | Self::ParameterizeTest { mappers, .. } => mappers.clone(),
            _ => Vec::new(),
        }
    }

    /// Claim group for edge-citing refactorings; `None` for declaration-only ones
    pub fn claim_group(&self) -> Option<ClaimGroup> {
        let kind = self.kind();
        let anchors = match self {
            Self::RenameOperation { before, after, .. }
            | Self::MoveOperation { before, after, .. }
            | Self::MoveAndRenameOperation { before, after, .. }
            | Self::PullUpOperation { before, after, .. }
            | Self::PushDownOperation { before, after, .. } => (*before, *after),
            Self::ExtractOperation {
                source_before,
                extracted,
                ..
            }
            | Self::ExtractAndMoveOperation {
                source_before,
                extracted,
                ..
            } => (*source_before, *extracted),
            Self::InlineOperation {
                inlined,
                target_after,
                ..
            }
            | Self::MoveAndInlineOperation {
                inlined,
                target_after,
                ..
            } => (*inlined, *target_after),
            Self::MergeOperation { merged, into, .. } => (*merged.first()?, *into),
            Self::SplitOperation { source, into, .. } => (*source, *into.first()?),
            Self::ParameterizeTest { tests, into, .. } => (*tests.first()?, *into),
            Self::MoveCode {
                source_before,
                target_after,
                ..
            } => (*source_before, *target_after),
            _ => return None,
        };
        Some((kind, anchors.0, anchors.1))
    }
}
