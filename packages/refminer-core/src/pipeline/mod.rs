//! Pipeline orchestration
//!
//! ```text
//! SourceSnapshot ──FrontEnd──► Model (before) ─┐
//!        │                     Model (after) ──┤
//!        └─► SkippedFile                       ▼
//!                          ModelDiffer::diff (rayon over type pairs)
//!                                              ▼
//!                          RefactoringDetector::detect (classify + merge)
//!                                              ▼
//!                          build_report → sorted MiningResult
//! ```

pub mod error;
pub mod miner;
pub mod ports;
pub mod result;
pub mod snapshot;

pub use crate::shared::CancellationToken;
pub use error::FrontEndError;
pub use miner::{RefactoringDetectionUseCase, RefactoringMiner};
pub use ports::FrontEnd;
pub use result::{MinedSnapshots, MiningResult};
pub use snapshot::{SkippedFile, SourceSnapshot};
