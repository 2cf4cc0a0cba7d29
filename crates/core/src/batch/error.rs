//! Error types for the batch module.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a batch before any file is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The root directory does not exist.
    #[error("Directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// The root is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// An external tool the batch depends on cannot be run.
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },
}

impl BatchError {
    /// Creates a new tool unavailable error.
    pub fn tool_unavailable(tool: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }
}

/// Pipeline stage a file failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    /// Reading stream metadata.
    Probe,
    /// Deciding the encode.
    Plan,
    /// Running the encoder.
    Encode,
    /// Replacing the target.
    Commit,
    /// The worker running the file died.
    Worker,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Probe => "probe",
            Self::Plan => "plan",
            Self::Encode => "encode",
            Self::Commit => "commit",
            Self::Worker => "worker",
        };
        f.write_str(name)
    }
}

/// A failure confined to one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed for {path}: {message}")]
pub struct FileError {
    /// File that failed.
    pub path: PathBuf,
    /// Stage that failed.
    pub stage: FileStage,
    /// Human readable cause.
    pub message: String,
}

impl FileError {
    /// Creates a new file error.
    pub fn new(path: impl Into<PathBuf>, stage: FileStage, message: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            stage,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::new("/videos/a.mp4", FileStage::Encode, "ffmpeg exited with 1");
        assert_eq!(
            err.to_string(),
            "encode failed for /videos/a.mp4: ffmpeg exited with 1"
        );
    }
}
