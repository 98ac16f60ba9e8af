//! Refactoring Application Layer (UseCase)
//!
//! Context → classifiers → merge. `RefactoringDetector` is the only entry
//! point; classifiers are not called from outside this layer.

pub mod classifiers;
mod context;
mod detector;
mod merge;

pub use context::{DetectionContext, OwnerRelation};
pub use detector::RefactoringDetector;
pub use merge::merge_candidates;
