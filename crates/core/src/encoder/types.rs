//! Types for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::policy::EncodePlan;

/// Video codec used for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
}

impl VideoCodec {
    /// Returns the ffmpeg codec name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
        }
    }
}

/// Audio codec used for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    /// Advanced Audio Coding
    Aac,
    /// Opus
    Opus,
}

impl AudioCodec {
    /// Returns the ffmpeg codec name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Opus => "libopus",
        }
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    /// MPEG-4 Part 14 (.mp4)
    Mp4,
    /// Matroska (.mkv)
    Mkv,
}

impl Container {
    /// Returns the ffmpeg muxer name (`-f`).
    pub fn ffmpeg_format(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "matroska",
        }
    }

    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
        }
    }
}

/// How the audio bitrate handed to ffmpeg is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioBitrateMode {
    /// Always encode audio at the plan's default bitrate.
    #[default]
    Fixed,
    /// Use the per-file decision; omit `-b:a` when it says "preserve".
    Planned,
}

/// A single re-encode request.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Source file (read only).
    pub input_path: PathBuf,
    /// Temporary output path written by the encoder.
    pub output_path: PathBuf,
    /// What to change.
    pub plan: EncodePlan,
}

impl EncodeRequest {
    /// Creates a new encode request.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        plan: EncodePlan,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            plan,
        }
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
    /// Path of the written output.
    pub output_path: PathBuf,
    /// Size of the output in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock duration of the encode.
    pub duration_ms: u64,
}
