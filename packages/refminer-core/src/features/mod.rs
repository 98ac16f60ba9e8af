//! Feature slices, leaves first
//!
//! replacement → body_mapper → model_diff → refactoring

pub mod body_mapper;
pub mod model_diff;
pub mod refactoring;
pub mod replacement;
