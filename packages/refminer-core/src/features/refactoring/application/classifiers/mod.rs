//! Refactoring classifiers
//!
//! Each classifier reads the diff through a `DetectionContext` and returns
//! candidates. Classifiers that run new body mappings push them into the
//! arena they are handed; the merge step decides which candidates survive.

pub mod attributes;
pub mod extract;
pub mod hierarchy;
pub mod inline;
pub mod local_variables;
pub mod merge_split;
pub mod move_code;
pub mod operations;
pub mod parameterize;
pub mod support;
pub mod types;
pub mod variables;
