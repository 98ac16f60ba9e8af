mod diff;

pub use diff::{
    AttributeMatch, AttributeMatchKind, ModelDiff, OperationMatch, OperationMatchKind, RenameHints,
    TypeMatch, TypeMatchKind,
};
