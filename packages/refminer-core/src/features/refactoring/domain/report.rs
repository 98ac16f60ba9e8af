//! Caller-facing report view

use super::refactoring::RefactoringKind;
use crate::shared::models::CodeRange;
use serde::Serialize;
use std::cmp::Ordering;

/// Qualified name plus signature of one declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeElement {
    pub qualified_name: String,
    pub signature: String,
}

impl CodeElement {
    pub fn new(qualified_name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            signature: signature.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringReport {
    pub kind: RefactoringKind,
    pub name: String,
    pub description: String,
    pub before_elements: Vec<CodeElement>,
    pub after_elements: Vec<CodeElement>,
    pub before_ranges: Vec<CodeRange>,
    pub after_ranges: Vec<CodeRange>,
}

impl RefactoringReport {
    /// Report order: kind, before ranges, after ranges, description
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.before_ranges.cmp(&other.before_ranges))
            .then_with(|| self.after_ranges.cmp(&other.after_ranges))
            .then_with(|| self.description.cmp(&other.description))
    }
}
