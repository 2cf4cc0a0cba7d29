//! Batch runner: sequential or bounded-concurrent fan-out over files.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::encoder::Encoder;
use crate::probe::Prober;
use crate::replacer::Replacer;

use super::config::BatchConfig;
use super::discovery::discover;
use super::error::{BatchError, FileError, FileStage};
use super::pipeline::FilePipeline;
use super::types::{BatchReport, FileOutcome, FileTask, RunMode};

type FileHandle = JoinHandle<Result<FileOutcome, FileError>>;

/// Drives a [`FilePipeline`] over one or many files.
pub struct BatchRunner<P: Prober, E: Encoder, R: Replacer> {
    pipeline: FilePipeline<P, E, R>,
    config: BatchConfig,
}

impl<P, E, R> BatchRunner<P, E, R>
where
    P: Prober + 'static,
    E: Encoder + 'static,
    R: Replacer + 'static,
{
    /// Creates a new runner.
    pub fn new(pipeline: FilePipeline<P, E, R>, config: BatchConfig) -> Self {
        Self { pipeline, config }
    }

    /// Returns the batch configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Returns the pipeline.
    pub fn pipeline(&self) -> &FilePipeline<P, E, R> {
        &self.pipeline
    }

    /// Discovers every matching file under `root` and normalizes each in place.
    ///
    /// The external tools are only checked once there is something to do,
    /// so an empty tree succeeds without them.
    pub async fn run_all(&self, root: &Path, mode: RunMode) -> Result<BatchReport, BatchError> {
        let files = discover(root, &self.config.extension)?;
        if files.is_empty() {
            info!(
                root = %root.display(),
                extension = %self.config.extension,
                "No matching files found"
            );
        } else {
            self.validate_tools().await?;
            info!(root = %root.display(), count = files.len(), ?mode, "Starting batch");
        }

        let tasks = files.into_iter().map(FileTask::in_place).collect();
        Ok(self.run_files(tasks, mode).await)
    }

    /// Checks that the prober and encoder can run.
    pub async fn validate_tools(&self) -> Result<(), BatchError> {
        let prober = self.pipeline.prober();
        prober
            .validate()
            .await
            .map_err(|e| BatchError::tool_unavailable(prober.name(), e))?;

        let encoder = self.pipeline.encoder();
        encoder
            .validate()
            .await
            .map_err(|e| BatchError::tool_unavailable(encoder.name(), e))?;
        Ok(())
    }

    /// Normalizes `input` into `output`.
    ///
    /// When `input` needs no work nothing is written to `output`.
    pub async fn run_single(&self, input: &Path, output: &Path) -> BatchReport {
        let output = std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf());
        self.run_files(vec![FileTask::new(input, output)], RunMode::Sequential)
            .await
    }

    /// Runs the given tasks and collects one result per task, in order.
    pub async fn run_files(&self, tasks: Vec<FileTask>, mode: RunMode) -> BatchReport {
        let started_at = Utc::now();
        let started = Instant::now();

        let results = match mode {
            RunMode::Sequential => self.run_sequential(tasks).await,
            RunMode::Concurrent { workers } => self.run_concurrent(tasks, workers).await,
        };

        let report = BatchReport {
            started_at,
            elapsed: started.elapsed(),
            results,
        };
        info!(
            "Processed {} files in {:.2} seconds",
            report.total(),
            report.elapsed.as_secs_f64()
        );
        report
    }

    async fn run_sequential(&self, tasks: Vec<FileTask>) -> Vec<Result<FileOutcome, FileError>> {
        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let path = task.input_path.clone();
            let handle = self.spawn_file(task, None);
            results.push(Self::join(path, handle).await);
        }
        results
    }

    async fn run_concurrent(
        &self,
        tasks: Vec<FileTask>,
        workers: usize,
    ) -> Vec<Result<FileOutcome, FileError>> {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));

        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let path = task.input_path.clone();
                (path, self.spawn_file(task, Some(Arc::clone(&semaphore))))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            results.push(Self::join(path, handle).await);
        }
        results
    }

    /// Spawns one file onto the runtime, optionally gated by `semaphore`.
    fn spawn_file(&self, task: FileTask, semaphore: Option<Arc<Semaphore>>) -> FileHandle {
        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
                    FileError::new(&task.input_path, FileStage::Worker, e)
                })?),
                None => None,
            };
            pipeline.process(&task).await
        })
    }

    async fn join(path: std::path::PathBuf, handle: FileHandle) -> Result<FileOutcome, FileError> {
        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Worker failed");
                Err(FileError::new(path, FileStage::Worker, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyEngine;
    use crate::replacer::FsReplacer;
    use crate::testing::{MockEncoder, MockProber};
    use std::time::Duration;
    use tempfile::TempDir;

    fn runner(
        prober: MockProber,
        encoder: MockEncoder,
    ) -> BatchRunner<MockProber, MockEncoder, FsReplacer> {
        let pipeline = FilePipeline::new(
            prober,
            PolicyEngine::default(),
            encoder,
            FsReplacer::with_defaults(),
        );
        BatchRunner::new(pipeline, BatchConfig::default())
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_sequential_processes_all() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.mp4", b"aaaa");
        write(&dir, "b.mp4", b"bbbb");

        let runner = runner(MockProber::oversized(), MockEncoder::new());
        let report = runner.run_all(dir.path(), RunMode::Sequential).await.unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.reencoded(), 2);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let dir = TempDir::new().unwrap();
        for i in 0..6 {
            write(&dir, &format!("{i}.mp4"), b"data");
        }

        let encoder = MockEncoder::new().with_delay(Duration::from_millis(40));
        let runner = runner(MockProber::oversized(), encoder);
        let report = runner
            .run_all(dir.path(), RunMode::Concurrent { workers: 2 })
            .await
            .unwrap();

        assert_eq!(report.reencoded(), 6);
        let encoder = runner.pipeline().encoder();
        assert_eq!(encoder.call_count().await, 6);
        assert!(encoder.max_concurrency().await <= 2);
    }

    #[tokio::test]
    async fn test_results_in_discovery_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c.mp4", "a.mp4", "b.mp4"] {
            write(&dir, name, b"data");
        }

        let runner = runner(MockProber::oversized(), MockEncoder::new());
        let report = runner
            .run_all(dir.path(), RunMode::Concurrent { workers: 3 })
            .await
            .unwrap();

        let names: Vec<_> = report
            .results
            .iter()
            .map(|r| {
                r.as_ref()
                    .unwrap()
                    .path()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[tokio::test]
    async fn test_single_skip_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "in.mp4", b"small");
        let output = dir.path().join("out.mp4");

        let runner = runner(MockProber::compliant(), MockEncoder::new());
        let report = runner.run_single(&input, &output).await;

        assert_eq!(report.skipped(), 1);
        assert!(!output.exists());
        assert_eq!(runner.pipeline().encoder().call_count().await, 0);
    }

    #[tokio::test]
    async fn test_single_writes_output_and_keeps_input() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "in.mp4", b"original");
        let output = dir.path().join("out.mp4");

        let runner = runner(MockProber::oversized(), MockEncoder::new());
        let report = runner.run_single(&input, &output).await;

        assert_eq!(report.reencoded(), 1);
        assert!(output.exists());
        assert_eq!(std::fs::read(&input).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_unavailable_encoder_stops_batch() {
        let dir = TempDir::new().unwrap();
        let clip = write(&dir, "a.mp4", b"data");

        let runner = runner(MockProber::oversized(), MockEncoder::new().unavailable());
        let result = runner.run_all(dir.path(), RunMode::Sequential).await;

        assert!(matches!(result, Err(BatchError::ToolUnavailable { .. })));
        assert_eq!(std::fs::read(&clip).unwrap(), b"data");
        assert_eq!(runner.pipeline().encoder().call_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_tree_needs_no_tools() {
        let dir = TempDir::new().unwrap();
        write(&dir, "notes.txt", b"text");

        let runner = runner(MockProber::oversized(), MockEncoder::new().unavailable());
        let report = runner.run_all(dir.path(), RunMode::Sequential).await.unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let runner = runner(MockProber::oversized(), MockEncoder::new());
        let result = runner
            .run_all(Path::new("/nonexistent/vidnorm"), RunMode::Sequential)
            .await;
        assert!(matches!(result, Err(BatchError::RootNotFound { .. })));
    }
}
