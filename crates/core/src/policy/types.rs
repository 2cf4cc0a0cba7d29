//! Types for the policy module.

use serde::{Deserialize, Serialize};

/// Fixed reference values of the skip gate.
///
/// These are deliberately independent of [`RewriteTargets`] and are not
/// read from configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipGateThresholds {
    /// Files must have an audio sample rate strictly below this (Hz).
    pub audio_sample_rate_hz: u32,
    /// Files must have an audio bitrate strictly below this (kbps).
    /// Also the floor under which the original audio bitrate is preserved.
    pub audio_bitrate_kbps: u32,
    /// Files must have a video bitrate strictly below this (kbps).
    pub video_bitrate_kbps: u32,
}

impl SkipGateThresholds {
    /// The standard gate: 32 kHz, 64 kbps audio, 350 kbps video.
    pub const STANDARD: Self = Self {
        audio_sample_rate_hz: 32_000,
        audio_bitrate_kbps: 64,
        video_bitrate_kbps: 350,
    };
}

impl Default for SkipGateThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// User-tunable targets applied when a file is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteTargets {
    /// Maximum output width in pixels.
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Maximum output height in pixels; also the rescale target.
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Frame rate files are reduced to.
    #[serde(default = "default_frame_rate")]
    pub target_frame_rate: f64,

    /// Video bitrate every rewritten file is encoded at (kbps).
    #[serde(default = "default_video_bitrate")]
    pub target_video_bitrate_kbps: u32,

    /// Audio bitrate the encoder pins in fixed audio mode (kbps).
    #[serde(default = "default_audio_bitrate")]
    pub target_audio_bitrate_kbps: u32,

    /// Audio sample rate files are downsampled to (Hz).
    #[serde(default = "default_sample_rate")]
    pub target_audio_sample_rate_hz: u32,
}

fn default_max_width() -> u32 {
    1280
}

fn default_max_height() -> u32 {
    720
}

fn default_frame_rate() -> f64 {
    24.0
}

fn default_video_bitrate() -> u32 {
    350
}

fn default_audio_bitrate() -> u32 {
    64
}

fn default_sample_rate() -> u32 {
    32_000
}

impl Default for RewriteTargets {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            target_frame_rate: default_frame_rate(),
            target_video_bitrate_kbps: default_video_bitrate(),
            target_audio_bitrate_kbps: default_audio_bitrate(),
            target_audio_sample_rate_hz: default_sample_rate(),
        }
    }
}

impl RewriteTargets {
    /// Sets the resolution caps.
    pub fn with_max_resolution(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Sets the target frame rate.
    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.target_frame_rate = fps;
        self
    }

    /// Sets the target video bitrate.
    pub fn with_video_bitrate(mut self, kbps: u32) -> Self {
        self.target_video_bitrate_kbps = kbps;
        self
    }

    /// Sets the target audio sample rate.
    pub fn with_audio_sample_rate(mut self, hz: u32) -> Self {
        self.target_audio_sample_rate_hz = hz;
        self
    }
}

/// What the encoder has to change for one file.
///
/// `None` fields mean "keep the source value": the encoder emits no
/// instruction for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodePlan {
    /// Whether any re-encode is needed.
    pub needs_work: bool,
    /// Reduced frame rate.
    pub new_frame_rate: Option<f64>,
    /// Rescale target height; width follows the aspect ratio.
    pub new_height: Option<u32>,
    /// Audio bitrate to re-target at (kbps).
    pub new_audio_bitrate_kbps: Option<u32>,
    /// Audio sample rate to downsample to (Hz).
    pub new_audio_sample_rate_hz: Option<u32>,
    /// Video bitrate (kbps). Always set once a rewrite happens.
    pub video_bitrate_kbps: u32,
    /// Audio bitrate used when the encoder ignores the per-file decision (kbps).
    pub default_audio_bitrate_kbps: u32,
}

impl EncodePlan {
    /// A plan that leaves the file alone.
    pub fn skip() -> Self {
        Self {
            needs_work: false,
            new_frame_rate: None,
            new_height: None,
            new_audio_bitrate_kbps: None,
            new_audio_sample_rate_hz: None,
            video_bitrate_kbps: 0,
            default_audio_bitrate_kbps: 0,
        }
    }

    /// Output dimensions for a source of `width` x `height`.
    ///
    /// Width is derived from the source aspect ratio and rounded to an
    /// even number, as 4:2:0 encoders require.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match self.new_height {
            Some(new_height) if height > 0 => {
                let scaled = width as f64 * new_height as f64 / height as f64;
                let even = ((scaled / 2.0).round() as u32 * 2).max(2);
                (even, new_height)
            }
            _ => (width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets() {
        let targets = RewriteTargets::default();
        assert_eq!(targets.max_width, 1280);
        assert_eq!(targets.max_height, 720);
        assert_eq!(targets.target_frame_rate, 24.0);
        assert_eq!(targets.target_audio_sample_rate_hz, 32_000);
    }

    #[test]
    fn test_targets_builder() {
        let targets = RewriteTargets::default()
            .with_max_resolution(854, 480)
            .with_frame_rate(30.0)
            .with_video_bitrate(800)
            .with_audio_sample_rate(44_100);

        assert_eq!(targets.max_width, 854);
        assert_eq!(targets.max_height, 480);
        assert_eq!(targets.target_frame_rate, 30.0);
        assert_eq!(targets.target_video_bitrate_kbps, 800);
        assert_eq!(targets.target_audio_sample_rate_hz, 44_100);
    }

    #[test]
    fn test_output_dimensions_16_9() {
        let plan = EncodePlan {
            new_height: Some(720),
            ..EncodePlan::skip()
        };
        assert_eq!(plan.output_dimensions(1920, 1080), (1280, 720));
        assert_eq!(plan.output_dimensions(3840, 2160), (1280, 720));
    }

    #[test]
    fn test_output_dimensions_rounds_to_even() {
        let plan = EncodePlan {
            new_height: Some(720),
            ..EncodePlan::skip()
        };
        // 1000 * 720 / 1001 = 719.28 -> 720 (already even)
        assert_eq!(plan.output_dimensions(1000, 1001), (720, 720));
        // 4:3 at 1440x1080 -> 960x720
        assert_eq!(plan.output_dimensions(1440, 1080), (960, 720));
        // 1366x768 -> 1280.6 -> 1280
        assert_eq!(plan.output_dimensions(1366, 768), (1280, 720));
    }

    #[test]
    fn test_output_dimensions_unchanged_without_rescale() {
        let plan = EncodePlan::skip();
        assert_eq!(plan.output_dimensions(640, 360), (640, 360));
    }
}
