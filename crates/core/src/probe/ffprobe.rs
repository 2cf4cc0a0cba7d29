//! FFprobe-based prober implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

use super::config::ProbeConfig;
use super::error::ProbeError;
use super::traits::Prober;
use super::types::{MediaProfile, StreamBitrates};

/// FFprobe-based prober implementation.
pub struct FfprobeProber {
    config: ProbeConfig,
}

#[derive(Deserialize)]
struct BitrateOutput {
    #[serde(default)]
    streams: Vec<BitrateStream>,
}

#[derive(Deserialize)]
struct BitrateStream {
    index: u32,
    bit_rate: Option<String>,
}

#[derive(Deserialize)]
struct ContainerOutput {
    #[serde(default)]
    streams: Vec<ContainerStream>,
}

#[derive(Deserialize)]
struct ContainerStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
}

/// Container-level parameters of a file, before bitrates are merged in.
#[derive(Debug, Clone, PartialEq)]
struct ContainerInfo {
    width: u32,
    height: u32,
    frame_rate: f64,
    audio_sample_rate_hz: Option<u32>,
}

impl FfprobeProber {
    /// Creates a new prober with the given configuration.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Creates a prober with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ProbeConfig::default())
    }

    /// Parses a frame rate like "24000/1001", "30/1" or "25".
    fn parse_frame_rate(raw: &str) -> Option<f64> {
        let rate = match raw.split_once('/') {
            Some((num, den)) => {
                let num = num.trim().parse::<f64>().ok()?;
                let den = den.trim().parse::<f64>().ok()?;
                if den == 0.0 {
                    return None;
                }
                num / den
            }
            None => raw.trim().parse::<f64>().ok()?,
        };
        (rate.is_finite() && rate > 0.0).then_some(rate)
    }

    /// Parses the per-stream bitrate query output.
    fn parse_bitrate_output(output: &str) -> Result<StreamBitrates, ProbeError> {
        let parsed: BitrateOutput = serde_json::from_str(output)
            .map_err(|e| ProbeError::decode(format!("bitrate query: {}", e)))?;

        let kbps_for = |index: u32| {
            parsed
                .streams
                .iter()
                .find(|s| s.index == index)
                .and_then(|s| s.bit_rate.as_deref())
                .and_then(|b| b.trim().parse::<u64>().ok())
                .map(StreamBitrates::bps_to_kbps)
        };

        Ok(StreamBitrates {
            video_kbps: kbps_for(0),
            audio_kbps: kbps_for(1),
        })
    }

    /// Parses the container inspection output.
    fn parse_container_output(path: &Path, output: &str) -> Result<ContainerInfo, ProbeError> {
        let parsed: ContainerOutput = serde_json::from_str(output)
            .map_err(|e| ProbeError::decode(format!("container inspection: {}", e)))?;

        let video = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| ProbeError::NoVideoStream {
                path: path.to_path_buf(),
            })?;

        let audio = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"));

        // A zero frame rate is kept as-is and rejected later by the policy engine.
        let frame_rate = video
            .avg_frame_rate
            .as_deref()
            .and_then(Self::parse_frame_rate)
            .or_else(|| video.r_frame_rate.as_deref().and_then(Self::parse_frame_rate))
            .unwrap_or(0.0);

        Ok(ContainerInfo {
            width: video.width.unwrap_or(0),
            height: video.height.unwrap_or(0),
            frame_rate,
            audio_sample_rate_hz: audio
                .and_then(|s| s.sample_rate.as_deref())
                .and_then(|r| r.trim().parse::<u32>().ok()),
        })
    }

    /// Logs whatever ffprobe wrote to stderr without treating it as fatal.
    fn surface_stderr(path: &Path, output: &Output) {
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!(path = %path.display(), "ffprobe: {}", line.trim());
        }
    }

    async fn run_ffprobe(&self, args: &[&str], path: &Path) -> Result<Output, ProbeError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(args)
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    ProbeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ProbeError::probe_failed(format!(
                "ffprobe exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::surface_stderr(path, &output);
        Ok(output)
    }

    /// Queries stream 0 and 1 bitrates. Never fails: undecodable output
    /// leaves both bitrates unknown.
    async fn probe_bitrates(&self, path: &Path) -> StreamBitrates {
        let result = self
            .run_ffprobe(
                &[
                    "-v",
                    "error",
                    "-show_entries",
                    "stream=index,bit_rate",
                    "-of",
                    "json",
                ],
                path,
            )
            .await
            .and_then(|output| {
                Self::parse_bitrate_output(&String::from_utf8_lossy(&output.stdout))
            });

        match result {
            Ok(bitrates) => bitrates,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Bitrate unknown, continuing");
                StreamBitrates::default()
            }
        }
    }

    async fn probe_container(&self, path: &Path) -> Result<ContainerInfo, ProbeError> {
        let output = self
            .run_ffprobe(&["-v", "error", "-show_streams", "-of", "json"], path)
            .await?;
        Self::parse_container_output(path, &String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<MediaProfile, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let container = self.probe_container(path).await?;
        let bitrates = self.probe_bitrates(path).await;

        let profile = MediaProfile {
            path: path.to_path_buf(),
            width: container.width,
            height: container.height,
            frame_rate: container.frame_rate,
            video_bitrate_kbps: bitrates.video_kbps,
            audio_bitrate_kbps: bitrates.audio_kbps,
            audio_sample_rate_hz: container.audio_sample_rate_hz,
        };
        debug!(?profile, "Probed media file");
        Ok(profile)
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        let result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProbeError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                })
            }
            Err(e) => Err(ProbeError::Io(e)),
        }
    }
}
