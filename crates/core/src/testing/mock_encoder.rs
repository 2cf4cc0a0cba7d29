//! Mock encoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::encoder::{EncodeRequest, EncodeResult, Encoder, EncoderError};

/// Mock implementation of the Encoder trait.
///
/// Writes a small deterministic payload derived from the input to the
/// requested output path. Tracks how many encodes ran at once so tests can
/// assert worker limits.
#[derive(Debug, Clone)]
pub struct MockEncoder {
    requests: Arc<RwLock<Vec<EncodeRequest>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    delay: Duration,
    available: bool,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Creates a new mock encoder.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            delay: Duration::ZERO,
            available: true,
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every encode take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes `validate` fail as if the ffmpeg binary were missing.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Makes encoding the input named `file_name` fail after writing a
    /// partial output.
    pub async fn fail_on(&self, file_name: &str) {
        self.failing.write().await.insert(file_name.to_string());
    }

    /// Requests received so far, in call order.
    pub async fn recorded_requests(&self) -> Vec<EncodeRequest> {
        self.requests.read().await.clone()
    }

    /// Number of encode calls.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Highest number of encodes observed running at the same time.
    pub async fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// The payload written for an input with the given content.
    pub fn encoded_payload(input: &[u8]) -> Vec<u8> {
        let mut payload = b"vidnorm:".to_vec();
        payload.extend(input.iter().take(16));
        payload
    }

    async fn run(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError> {
        let started = Instant::now();

        if !request.plan.needs_work {
            return Err(EncoderError::NothingToDo {
                path: request.input_path.clone(),
            });
        }

        let input = tokio::fs::read(&request.input_path).await.map_err(|_| {
            EncoderError::InputNotFound {
                path: request.input_path.clone(),
            }
        })?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let name = file_name(&request.input_path);
        if self.failing.read().await.contains(&name) {
            tokio::fs::write(&request.output_path, b"partial").await?;
            return Err(EncoderError::encode_failed(
                "FFmpeg exited with status 1",
                Some("Conversion failed!".to_string()),
            ));
        }

        let payload = Self::encoded_payload(&input);
        tokio::fs::write(&request.output_path, &payload).await?;

        Ok(EncodeResult {
            output_path: request.output_path.clone(),
            output_size_bytes: payload.len() as u64,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError> {
        self.requests.write().await.push(request.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let result = self.run(request).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        if self.available {
            Ok(())
        } else {
            Err(EncoderError::FfmpegNotFound {
                path: "ffmpeg".into(),
            })
        }
    }
}
