//! Types for the probe module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current encoding parameters of a video file.
///
/// Captured fresh for every file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProfile {
    /// File the profile was read from.
    pub path: PathBuf,
    /// Width of the first video stream in pixels.
    pub width: u32,
    /// Height of the first video stream in pixels.
    pub height: u32,
    /// Frames per second of the first video stream.
    pub frame_rate: f64,
    /// Video bitrate in kbps, if reported.
    pub video_bitrate_kbps: Option<u32>,
    /// Audio bitrate in kbps, if reported.
    pub audio_bitrate_kbps: Option<u32>,
    /// Audio sample rate in Hz. `None` when the file has no audio stream.
    pub audio_sample_rate_hz: Option<u32>,
}

/// Bitrates reported by the per-stream bitrate query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamBitrates {
    /// Bitrate of stream 0, in kbps.
    pub video_kbps: Option<u32>,
    /// Bitrate of stream 1, in kbps.
    pub audio_kbps: Option<u32>,
}

impl StreamBitrates {
    /// Converts a bits-per-second value to kbps, rounding to the nearest thousand.
    pub fn bps_to_kbps(bps: u64) -> u32 {
        ((bps + 500) / 1000).min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_rounding() {
        assert_eq!(StreamBitrates::bps_to_kbps(0), 0);
        assert_eq!(StreamBitrates::bps_to_kbps(499), 0);
        assert_eq!(StreamBitrates::bps_to_kbps(500), 1);
        assert_eq!(StreamBitrates::bps_to_kbps(63_499), 63);
        assert_eq!(StreamBitrates::bps_to_kbps(128_000), 128);
        assert_eq!(StreamBitrates::bps_to_kbps(349_600), 350);
    }
}
