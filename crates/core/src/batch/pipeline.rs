//! Per-file probe → plan → encode → commit pipeline.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::encoder::{EncodeRequest, Encoder};
use crate::policy::PolicyEngine;
use crate::probe::Prober;
use crate::replacer::Replacer;

use super::error::{FileError, FileStage};
use super::types::{FileOutcome, FileTask};

/// Runs one file through the whole normalization pipeline.
///
/// Cloning is cheap: all components are shared.
pub struct FilePipeline<P: Prober, E: Encoder, R: Replacer> {
    prober: Arc<P>,
    engine: Arc<PolicyEngine>,
    encoder: Arc<E>,
    replacer: Arc<R>,
}

impl<P: Prober, E: Encoder, R: Replacer> Clone for FilePipeline<P, E, R> {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            engine: Arc::clone(&self.engine),
            encoder: Arc::clone(&self.encoder),
            replacer: Arc::clone(&self.replacer),
        }
    }
}

impl<P: Prober, E: Encoder, R: Replacer> FilePipeline<P, E, R> {
    /// Creates a new pipeline.
    pub fn new(prober: P, engine: PolicyEngine, encoder: E, replacer: R) -> Self {
        Self::from_shared(
            Arc::new(prober),
            Arc::new(engine),
            Arc::new(encoder),
            Arc::new(replacer),
        )
    }

    /// Creates a pipeline from components the caller keeps handles to.
    pub fn from_shared(
        prober: Arc<P>,
        engine: Arc<PolicyEngine>,
        encoder: Arc<E>,
        replacer: Arc<R>,
    ) -> Self {
        Self {
            prober,
            engine,
            encoder,
            replacer,
        }
    }

    /// The prober used by this pipeline.
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// The encoder used by this pipeline.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Processes a single file.
    ///
    /// Any error is scoped to `task` and carries the stage it happened in.
    pub async fn process(&self, task: &FileTask) -> Result<FileOutcome, FileError> {
        let started = Instant::now();
        let input = task.input_path.as_path();

        let profile = self
            .prober
            .probe(input)
            .await
            .map_err(|e| FileError::new(input, FileStage::Probe, e))?;

        debug!(
            path = %input.display(),
            width = profile.width,
            height = profile.height,
            fps = profile.frame_rate,
            video_kbps = ?profile.video_bitrate_kbps,
            audio_kbps = ?profile.audio_bitrate_kbps,
            sample_rate = ?profile.audio_sample_rate_hz,
            "Probed file"
        );

        let plan = self
            .engine
            .plan(&profile)
            .map_err(|e| FileError::new(input, FileStage::Plan, e))?;

        if !plan.needs_work {
            info!(path = %input.display(), "Within bounds, skipping");
            return Ok(FileOutcome::Skipped {
                path: task.input_path.clone(),
            });
        }

        let input_size_bytes = tokio::fs::metadata(input)
            .await
            .map(|m| m.len())
            .map_err(|e| FileError::new(input, FileStage::Encode, e))?;

        info!(
            path = %input.display(),
            temp = %task.temp_path.display(),
            new_height = ?plan.new_height,
            new_fps = ?plan.new_frame_rate,
            "Re-encoding"
        );

        let request = EncodeRequest::new(&task.input_path, &task.temp_path, plan);
        if let Err(e) = self.encoder.encode(&request).await {
            self.discard_temp(task).await;
            error!(path = %input.display(), error = %e, "Encode failed");
            return Err(FileError::new(input, FileStage::Encode, e));
        }

        let commit = match self
            .replacer
            .commit(&task.output_path, &task.temp_path)
            .await
        {
            Ok(commit) => commit,
            Err(e) => {
                if e.original_displaced() {
                    error!(
                        path = %input.display(),
                        temp = %task.temp_path.display(),
                        error = %e,
                        "Commit failed and the original could not be restored; leaving files for recovery"
                    );
                } else {
                    self.discard_temp(task).await;
                    error!(path = %input.display(), error = %e, "Commit failed");
                }
                return Err(FileError::new(input, FileStage::Commit, e));
            }
        };

        let duration = started.elapsed();
        info!(
            path = %input.display(),
            output = %commit.target.display(),
            input_bytes = input_size_bytes,
            output_bytes = commit.size_bytes,
            "Re-encoded in {:.2} seconds",
            duration.as_secs_f64()
        );

        Ok(FileOutcome::Reencoded {
            path: task.input_path.clone(),
            output_path: commit.target,
            input_size_bytes,
            output_size_bytes: commit.size_bytes,
            duration,
        })
    }

    async fn discard_temp(&self, task: &FileTask) {
        if let Err(e) = self.replacer.discard(&task.temp_path).await {
            warn!(temp = %task.temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}
