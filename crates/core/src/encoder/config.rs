//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::{AudioBitrateMode, AudioCodec, Container, VideoCodec};

/// Configuration for the FFmpeg-based encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Video codec.
    #[serde(default = "default_video_codec")]
    pub video_codec: VideoCodec,

    /// Audio codec.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: AudioCodec,

    /// Output container.
    #[serde(default = "default_container")]
    pub container: Container,

    /// Encoder speed preset. Favors throughput over compression.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Encoder threads per file. Defaults to the number of CPU cores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// How the audio bitrate is chosen.
    #[serde(default)]
    pub audio_bitrate_mode: AudioBitrateMode,

    /// Timeout for a single encode in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg output arguments.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> VideoCodec {
    VideoCodec::H264
}

fn default_audio_codec() -> AudioCodec {
    AudioCodec::Aac
}

fn default_container() -> Container {
    Container::Mp4
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            container: default_container(),
            preset: default_preset(),
            threads: None,
            audio_bitrate_mode: AudioBitrateMode::default(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the per-file thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the audio bitrate mode.
    pub fn with_audio_bitrate_mode(mut self, mode: AudioBitrateMode) -> Self {
        self.audio_bitrate_mode = mode;
        self
    }

    /// Thread count handed to ffmpeg.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}
