//! Replacement classification
//!
//! Types the sub-expression differences inside one aligned statement pair.
//!
//! ```text
//! before tokens ─┐
//!                ├─► same length? ──yes──► positional diff ─► per-token decision tree
//! after tokens ──┘        │
//!                         no
//!                         ▼
//!                  LCS alignment ─► hunks ─► argument added/removed, inverted
//!                                           condition, coarse expression replaced
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{Replacement, ReplacementKind};
pub use infrastructure::classifier::{Comparison, ReplacementClassifier};
pub use infrastructure::tokenizer::{canonical_text, tokenize, Token, TokenKind};
