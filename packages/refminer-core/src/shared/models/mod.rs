//! Declaration model
//!
//! Two independent `Model` snapshots (before/after) are produced by an external
//! front end. Everything here is immutable once built; cross-snapshot
//! correspondence is never stored in the model itself, only as index pairs
//! (`TypeRef`, `OperationRef`, `AttributeRef`) owned by the matchers.

pub mod builders;
pub mod declaration;
pub mod expression;
pub mod span;
pub mod statement;

pub use declaration::{
    Annotation, Attribute, AttributeRef, Model, Modifier, Operation, OperationRef, Parameter,
    TypeDeclaration, TypeKind, TypeRef, Visibility,
};
pub use expression::{Expression, ExpressionKind, LiteralKind};
pub use span::{CodeRange, Span};
pub use statement::{Body, Branch, BranchKind, LocalVariable, Statement, StatementKind, WalkEntry};
