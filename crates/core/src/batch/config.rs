//! Configuration for the batch module.

use serde::{Deserialize, Serialize};

use super::types::RunMode;

/// Configuration for batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// File extension of videos to process, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Whether `--all` runs use the worker pool.
    #[serde(default = "default_true")]
    pub concurrent: bool,

    /// Worker pool size. Defaults to half the CPU cores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

fn default_extension() -> String {
    "mp4".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            concurrent: true,
            workers: None,
        }
    }
}

impl BatchConfig {
    /// Sets the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enables or disables the worker pool.
    pub fn with_concurrency(mut self, enabled: bool) -> Self {
        self.concurrent = enabled;
        self
    }

    /// Worker pool size: configured, or half the cores (at least one).
    ///
    /// Every encode already uses all cores, so the pool leaves headroom.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(num_cpus::get() / 2).max(1)
    }

    /// The run mode these settings select.
    pub fn run_mode(&self) -> RunMode {
        if self.concurrent {
            RunMode::Concurrent {
                workers: self.effective_workers(),
            }
        } else {
            RunMode::Sequential
        }
    }
}
