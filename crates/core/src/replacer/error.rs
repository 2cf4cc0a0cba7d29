//! Error types for the replacer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while committing an encode.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The temporary encode to commit does not exist.
    #[error("Temporary file not found: {path}")]
    TempMissing { path: PathBuf },

    /// Moving the original aside failed; nothing was changed.
    #[error("Failed to back up {target} to {backup}")]
    BackupFailed {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Renaming the temp file onto the target failed; the original was restored.
    #[error("Failed to move {temp} onto {target}")]
    PromoteFailed {
        temp: PathBuf,
        target: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Promotion and restore both failed. The original survives at `backup`.
    #[error("Failed to restore {target}; original preserved at {backup}")]
    RestoreFailed {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Committed content differs from the temp file.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Failed to calculate a checksum.
    #[error("Failed to calculate checksum for {path}")]
    ChecksumCalculationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplaceError {
    /// Whether the original content may no longer be at its own path.
    pub fn original_displaced(&self) -> bool {
        matches!(self, Self::RestoreFailed { .. })
    }
}
