//! Error types for refminer-core
//!
//! Only input problems and broken invariants surface as errors. Ambiguous
//! matches and budget exhaustion are resolved inside the engine and never
//! reach this type.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for refminer-core
#[derive(Debug, Error)]
pub enum MinerError {
    /// IO error (reading configuration or source files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing declaration tree for one input file
    #[error("Invalid input '{path}': {reason}")]
    Input { path: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A mapper result or refactoring violated a structural invariant
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// The caller cancelled the run before any result was committed
    #[error("Detection cancelled")]
    Cancelled,
}

impl MinerError {
    /// Create an input error for a specific file
    pub fn input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// True for errors that only affect a single input file
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Io(_))
    }
}

/// Result type alias for refminer-core
pub type Result<T> = std::result::Result<T, MinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = MinerError::input("src/Foo.java", "missing type name");
        assert_eq!(
            err.to_string(),
            "Invalid input 'src/Foo.java': missing type name"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invariant_is_not_recoverable() {
        let err = MinerError::invariant("before fragment mapped twice");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("mapped twice"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MinerError = io.into();
        assert!(matches!(err, MinerError::Io(_)));
    }
}
