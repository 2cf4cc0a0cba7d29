//! Error types for the policy module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while planning an encode.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The probed source cannot be re-encoded meaningfully.
    #[error("Invalid source {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: String },
}

impl PolicyError {
    /// Creates a new invalid source error.
    pub fn invalid_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
