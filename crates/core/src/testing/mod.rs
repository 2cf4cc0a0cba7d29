//! Testing utilities and mock implementations.
//!
//! The mocks stand in for the ffprobe and ffmpeg subprocesses so the
//! pipeline and batch runner can be exercised on plain files. Real
//! filesystem replacement is done with [`crate::replacer::FsReplacer`]
//! against a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidnorm_core::testing::{MockEncoder, MockProber};
//!
//! let prober = MockProber::oversized();
//! prober.fail_on("broken.mp4").await;
//!
//! let encoder = MockEncoder::new().with_delay(Duration::from_millis(50));
//! // Build a FilePipeline with them...
//! assert!(encoder.max_concurrency().await <= 2);
//! ```

mod mock_encoder;
mod mock_prober;

pub use mock_encoder::MockEncoder;
pub use mock_prober::MockProber;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::probe::MediaProfile;

    /// A 1080p30 file with high bitrates: every dimension is over the targets.
    pub fn oversized_profile(path: impl AsRef<Path>) -> MediaProfile {
        MediaProfile {
            path: path.as_ref().to_path_buf(),
            width: 1920,
            height: 1080,
            frame_rate: 30.0,
            video_bitrate_kbps: Some(4000),
            audio_bitrate_kbps: Some(128),
            audio_sample_rate_hz: Some(48000),
        }
    }

    /// A small file already under every skip-gate threshold.
    pub fn compliant_profile(path: impl AsRef<Path>) -> MediaProfile {
        MediaProfile {
            path: path.as_ref().to_path_buf(),
            width: 640,
            height: 360,
            frame_rate: 15.0,
            video_bitrate_kbps: Some(300),
            audio_bitrate_kbps: Some(48),
            audio_sample_rate_hz: Some(22050),
        }
    }

    /// A file with no audio stream.
    pub fn silent_profile(path: impl AsRef<Path>) -> MediaProfile {
        MediaProfile {
            audio_bitrate_kbps: None,
            audio_sample_rate_hz: None,
            ..oversized_profile(path)
        }
    }

    /// Writes an executable `/bin/sh` script named `name` into `dir`.
    ///
    /// Used to stand in for ffprobe or ffmpeg with scripted output.
    #[cfg(unix)]
    pub fn shell_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}"))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}
