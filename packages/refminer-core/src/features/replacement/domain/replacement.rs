//! Replacement domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of sub-expression difference between two mapped fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementKind {
    VariableRenamed,
    InvocationRenamed,
    TypeChanged,
    StringLiteralChanged,
    NumberLiteralChanged,
    LiteralChanged,
    /// A literal became a variable reference (parameterization)
    LiteralToVariable,
    VariableToLiteral,
    OperatorChanged,
    ConditionInverted,
    ArgumentAdded,
    ArgumentRemoved,
    ArgumentsReordered,
    /// The same expression now sits inside a different statement kind
    ExpressionWrapped,
    /// Coarse difference that no finer kind describes
    ExpressionReplaced,
}

impl ReplacementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VariableRenamed => "variable renamed",
            Self::InvocationRenamed => "invocation renamed",
            Self::TypeChanged => "type changed",
            Self::StringLiteralChanged => "string literal changed",
            Self::NumberLiteralChanged => "number literal changed",
            Self::LiteralChanged => "literal changed",
            Self::LiteralToVariable => "literal to variable",
            Self::VariableToLiteral => "variable to literal",
            Self::OperatorChanged => "operator changed",
            Self::ConditionInverted => "condition inverted",
            Self::ArgumentAdded => "argument added",
            Self::ArgumentRemoved => "argument removed",
            Self::ArgumentsReordered => "arguments reordered",
            Self::ExpressionWrapped => "expression wrapped",
            Self::ExpressionReplaced => "expression replaced",
        }
    }

    /// Pure renames leave program structure untouched
    pub fn is_rename(&self) -> bool {
        matches!(self, Self::VariableRenamed | Self::InvocationRenamed)
    }

    pub fn is_literal_change(&self) -> bool {
        matches!(
            self,
            Self::StringLiteralChanged | Self::NumberLiteralChanged | Self::LiteralChanged
        )
    }
}

impl fmt::Display for ReplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified difference with the before/after text it replaces
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Replacement {
    pub kind: ReplacementKind,
    pub before: String,
    pub after: String,
}

impl Replacement {
    pub fn new(kind: ReplacementKind, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            kind,
            before: before.into(),
            after: after.into(),
        }
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}→{}", self.kind, self.before, self.after)
    }
}
