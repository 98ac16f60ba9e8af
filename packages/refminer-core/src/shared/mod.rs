//! Shared declaration model and run-scoped primitives consumed by every feature

pub mod cancellation;
pub mod models;

pub use cancellation::CancellationToken;
