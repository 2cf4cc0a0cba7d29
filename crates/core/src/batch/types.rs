//! Types for the batch module.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use super::error::FileError;
use crate::replacer::{unique_sibling, WorkFileKind};

/// How a batch is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One file at a time, in discovery order.
    Sequential,
    /// A fixed pool of workers.
    Concurrent { workers: usize },
}

/// One file to normalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Source file.
    pub input_path: PathBuf,
    /// Where the result ends up. Equal to `input_path` for in-place runs.
    pub output_path: PathBuf,
    /// Unique scratch path next to `output_path`.
    pub temp_path: PathBuf,
}

impl FileTask {
    /// A task writing to `output_path`.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        Self {
            input_path: input_path.into(),
            temp_path: unique_sibling(&output_path, WorkFileKind::Temp),
            output_path,
        }
    }

    /// A task that overwrites its input.
    pub fn in_place(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path)
    }

    /// Whether the task replaces its own input.
    pub fn is_in_place(&self) -> bool {
        self.input_path == self.output_path
    }
}

/// What happened to a file that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Already within bounds; nothing was written.
    Skipped { path: PathBuf },
    /// Re-encoded and committed.
    Reencoded {
        path: PathBuf,
        output_path: PathBuf,
        input_size_bytes: u64,
        output_size_bytes: u64,
        duration: Duration,
    },
}

impl FileOutcome {
    /// Source path of the file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped { path } | Self::Reencoded { path, .. } => path,
        }
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole run.
    pub elapsed: Duration,
    /// One entry per file, in discovery order.
    pub results: Vec<Result<FileOutcome, FileError>>,
}

impl BatchReport {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Files that were skipped or re-encoded.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Files left alone because they were within bounds.
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(FileOutcome::Skipped { .. })))
            .count()
    }

    /// Files that were re-encoded.
    pub fn reencoded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(FileOutcome::Reencoded { .. })))
            .count()
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Iterates over per-file failures.
    pub fn failures(&self) -> impl Iterator<Item = &FileError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    /// Bytes saved across re-encoded files (negative if outputs grew).
    pub fn bytes_saved(&self) -> i64 {
        self.results
            .iter()
            .filter_map(|r| match r {
                Ok(FileOutcome::Reencoded {
                    input_size_bytes,
                    output_size_bytes,
                    ..
                }) => Some(*input_size_bytes as i64 - *output_size_bytes as i64),
                _ => None,
            })
            .sum()
    }

    /// Process exit code: 1 when files were found but none succeeded.
    pub fn exit_code(&self) -> i32 {
        if self.total() > 0 && self.succeeded() == 0 {
            1
        } else {
            0
        }
    }

    /// Logs the per-file failures and the totals.
    pub fn log_summary(&self) {
        for failure in self.failures() {
            error!(path = %failure.path.display(), stage = %failure.stage, "{}", failure.message);
        }
        info!(
            total = self.total(),
            reencoded = self.reencoded(),
            skipped = self.skipped(),
            failed = self.failed(),
            bytes_saved = self.bytes_saved(),
            "Batch finished in {:.2} seconds",
            self.elapsed.as_secs_f64()
        );
    }
}
