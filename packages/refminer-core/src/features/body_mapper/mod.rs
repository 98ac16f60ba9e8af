//! Statement/expression body mapper
//!
//! Aligns two ordered, nested statement trees and explains the differences.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ before body  │   │  after body  │      FragmentTree: pre-order ids, canonical
//! └──────┬───────┘   └──────┬───────┘      tokens, param→argument substitution
//!        └────────┬─────────┘
//!                 ▼
//!   1. exact      identical text (whole subtrees first), closest position
//!   2. leaf       call expression re-hosted in another statement kind
//!   3. structural same kind + condition, recurse into aligned branches
//!   4. replacement token similarity above the floor, greedy best-first
//!   5. residual   unmatched-before / unmatched-after
//!                 ▼
//!          BodyMapping (edges + residuals), stored in a MapperArena
//! ```
//!
//! A mapper run never fails. Bodies above the pair budget, or runs that hit
//! the time budget, keep whatever the finished passes produced and are
//! flagged `degraded`.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::mapper::{BodyMapper, MappingRequest};
pub use domain::{
    BodyMapping, Fragment, MapperArena, MapperId, MappingEdge, MatchPass, StatementId,
};
pub use infrastructure::fragments::{
    substitution_for_call, ExpressionFragment, FragmentNode, FragmentTree, Substitution,
};
