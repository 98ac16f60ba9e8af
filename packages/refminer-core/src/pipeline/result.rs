//! Pipeline outputs

use super::snapshot::SkippedFile;
use crate::features::model_diff::ModelDiff;
use crate::features::refactoring::{Refactoring, RefactoringReport};
use crate::shared::models::Model;

/// Outcome of one comparison
///
/// `refactorings[i]` and `reports[i]` describe the same refactoring; both are
/// in report order. Every `MapperId` a refactoring cites resolves in
/// `diff.mappers`.
#[derive(Debug, Clone, Default)]
pub struct MiningResult {
    pub refactorings: Vec<Refactoring>,
    pub reports: Vec<RefactoringReport>,
    pub diff: ModelDiff,
    pub skipped_files: Vec<SkippedFile>,
    /// The cancellation token fired; results are the ones committed before it
    pub cancelled: bool,
    /// Body mappings that hit a size or time budget
    pub degraded_mappings: usize,
}

impl MiningResult {
    pub fn is_empty(&self) -> bool {
        self.refactorings.is_empty()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.description.as_str()).collect()
    }
}

/// Source-level result: the models the front end built, plus the mining result
/// whose references point into them
#[derive(Debug, Clone)]
pub struct MinedSnapshots {
    pub before: Model,
    pub after: Model,
    pub result: MiningResult,
}
