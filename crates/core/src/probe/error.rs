//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while probing a media file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFprobe ran but reported failure.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// FFprobe output could not be decoded.
    #[error("Failed to decode probe output: {reason}")]
    Decode { reason: String },

    /// The container has no video stream.
    #[error("No video stream in {path}")]
    NoVideoStream { path: PathBuf },

    /// I/O error while running ffprobe.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}
