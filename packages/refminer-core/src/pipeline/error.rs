//! Front-end errors
//!
//! A front end failing on one file never aborts a run; the pipeline turns
//! these into `SkippedFile` records.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontEndError {
    /// Source text could not be parsed
    #[error("Failed to parse {file_path}: {reason}")]
    Parse { file_path: String, reason: String },

    /// File is not in a language the front end handles
    #[error("Unsupported file: {0}")]
    Unsupported(String),

    /// Parsed, but the declaration tree is incomplete
    #[error("Malformed declaration tree in {file_path}: {reason}")]
    Malformed { file_path: String, reason: String },
}

impl FrontEndError {
    pub fn parse(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            file_path: file_path.into(),
            reason: reason.into(),
        }
    }
}
