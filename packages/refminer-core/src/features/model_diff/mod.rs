//! Declaration matcher (model diff)
//!
//! ```text
//! before Model ─┐
//!               ├─► types: same FQN ─► common
//! after Model ──┘          member overlap ─► moved / renamed / moved+renamed
//!                          rest ─► added / removed
//!                               │
//!                 per type pair (rayon)
//!                               ▼
//!   operations: exact signature ─► statement-count buckets ─► speculative
//!               body mapping ─► coverage / signature distance / order
//!   attributes: same name ─► renames backed by replacement evidence
//!                               │
//!                               ▼
//!   cross-type: leftover operations and attributes paired across owners
//! ```
//!
//! Every body mapping produced here is stored in the diff's `MapperArena` and
//! referenced by `MapperId` from the matches.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::differ::ModelDiffer;
pub use domain::{
    AttributeMatch, AttributeMatchKind, ModelDiff, OperationMatch, OperationMatchKind, RenameHints,
    TypeMatch, TypeMatchKind,
};
