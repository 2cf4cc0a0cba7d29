//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{AudioBitrateMode, EncodeRequest, EncodeResult};

/// Number of trailing stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for a request.
    fn build_args(&self, request: &EncodeRequest) -> Vec<String> {
        let plan = &request.plan;
        let mut args = vec![
            "-y".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            request.input_path.to_string_lossy().to_string(),
        ];

        // Video
        args.extend([
            "-c:v".to_string(),
            self.config.video_codec.ffmpeg_codec().to_string(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-b:v".to_string(),
            format!("{}k", plan.video_bitrate_kbps),
        ]);

        if let Some(fps) = plan.new_frame_rate {
            args.extend(["-r".to_string(), fps.to_string()]);
        }

        // Width follows the source aspect ratio, kept even.
        if let Some(height) = plan.new_height {
            args.extend(["-vf".to_string(), format!("scale=-2:{}", height)]);
        }

        // Audio
        args.extend([
            "-c:a".to_string(),
            self.config.audio_codec.ffmpeg_codec().to_string(),
        ]);

        let audio_bitrate = match self.config.audio_bitrate_mode {
            AudioBitrateMode::Fixed => Some(plan.default_audio_bitrate_kbps),
            AudioBitrateMode::Planned => plan.new_audio_bitrate_kbps,
        };
        if let Some(kbps) = audio_bitrate {
            args.extend(["-b:a".to_string(), format!("{}k", kbps)]);
        }

        if let Some(rate) = plan.new_audio_sample_rate_hz {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }

        args.extend([
            "-threads".to_string(),
            self.config.effective_threads().to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // The temp path carries no media extension, so the muxer is explicit.
        args.extend([
            "-f".to_string(),
            self.config.container.ffmpeg_format().to_string(),
            request.output_path.to_string_lossy().to_string(),
        ]);

        args
    }

    async fn run_encode(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError> {
        let start = Instant::now();
        let args = self.build_args(request);
        debug!(input = %request.input_path.display(), ?args, "Starting ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EncoderError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncoderError::encode_failed("ffmpeg stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr);

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            // ffmpeg may print non-UTF-8 metadata; keep draining regardless.
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut line = Vec::new();
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    break;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(String::from_utf8_lossy(&line).trim_end().to_string());
            }

            let status = child.wait().await?;
            let tail: Vec<String> = tail.into();
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, tail.join("\n")))
        })
        .await;

        match result {
            Ok(Ok((status, stderr_tail))) => {
                if !status.success() {
                    return Err(EncoderError::encode_failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        (!stderr_tail.is_empty()).then_some(stderr_tail),
                    ));
                }
            }
            Ok(Err(e)) => return Err(EncoderError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(EncoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        let output_meta = tokio::fs::metadata(&request.output_path)
            .await
            .map_err(|_| EncoderError::encode_failed("Output file not created", None))?;

        Ok(EncodeResult {
            output_path: request.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Removes a partially written output, if any.
    async fn discard_partial(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
        }
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError> {
        if !request.plan.needs_work {
            return Err(EncoderError::NothingToDo {
                path: request.input_path.clone(),
            });
        }
        if !request.input_path.exists() {
            return Err(EncoderError::InputNotFound {
                path: request.input_path.clone(),
            });
        }

        let result = self.run_encode(request).await;
        if result.is_err() {
            Self::discard_partial(&request.output_path).await;
        }
        result
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EncoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(e) => Err(EncoderError::Io(e)),
        }
    }
}
