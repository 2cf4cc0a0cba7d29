//! Batch module: discovers videos and runs each through
//! probe → plan → encode → commit.
//!
//! Every file is handled in isolation. A failure is captured as a
//! [`FileError`] for that file and never stops the rest of the batch.
//!
//! # Example
//!
//! ```ignore
//! use vidnorm_core::batch::{BatchRunner, FilePipeline, RunMode};
//!
//! let pipeline = FilePipeline::new(prober, PolicyEngine::default(), encoder, replacer);
//! let runner = BatchRunner::new(pipeline, BatchConfig::default());
//!
//! let report = runner.run_all(Path::new("."), RunMode::Concurrent { workers: 4 }).await?;
//! println!("{} re-encoded, {} failed", report.reencoded(), report.failed());
//! ```

mod config;
mod discovery;
mod error;
mod pipeline;
mod runner;
mod types;

pub use config::BatchConfig;
pub use discovery::discover;
pub use error::{BatchError, FileError, FileStage};
pub use pipeline::FilePipeline;
pub use runner::BatchRunner;
pub use types::{BatchReport, FileOutcome, FileTask, RunMode};
