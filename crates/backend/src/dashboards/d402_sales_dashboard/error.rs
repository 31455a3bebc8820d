use std::path::PathBuf;
use thiserror::Error;

/// Dataset load failures
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn malformed(line: u64, reason: impl Into<String>) -> Self {
        LoadError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}
