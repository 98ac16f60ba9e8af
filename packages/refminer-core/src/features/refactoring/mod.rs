//! Refactoring classification
//!
//! ```text
//! ModelDiff + MapperArena
//!         │
//!         ▼
//!   nested classifiers (mutate the arena, run in order)
//!     extract → inline → merge/split → parameterize test → move code
//!         │
//!         ▼
//!   declaration classifiers (read-only, rayon::join)
//!     operations · variables · types · attributes
//!         │
//!         ▼
//!   merge: dedupe → priority sort → claim ledger → bijection check
//!         │
//!         ▼
//!   Vec<Refactoring> ──► build_report ──► RefactoringReport
//! ```
//!
//! A fragment can be explained by one claim group only. Extractions claim
//! first, so the statements they take are never also reported as evidence
//! for a rename of the enclosing operation.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::RefactoringDetector;
pub use domain::{ClaimGroup, CodeElement, DeclarationPair, Refactoring, RefactoringKind, RefactoringReport};
pub use infrastructure::build_report;
