//! Probe module for reading a video file's current encoding parameters.
//!
//! Two separate ffprobe queries are merged into one [`MediaProfile`]:
//!
//! - a bitrate query over the first two streams (index 0 is video,
//!   index 1 is audio by convention), which degrades to "unknown" when
//!   its output cannot be decoded;
//! - a container inspection for resolution, frame rate and audio sample
//!   rate, which is required for the file to be processed at all.
//!
//! # Example
//!
//! ```ignore
//! use vidnorm_core::probe::{FfprobeProber, Prober};
//!
//! let prober = FfprobeProber::with_defaults();
//! let profile = prober.probe(Path::new("/videos/clip.mp4")).await?;
//! println!("{}x{} @ {} fps", profile.width, profile.height, profile.frame_rate);
//! ```

mod config;
mod error;
mod ffprobe;
mod traits;
mod types;

pub use config::ProbeConfig;
pub use error::ProbeError;
pub use ffprobe::FfprobeProber;
pub use traits::Prober;
pub use types::{MediaProfile, StreamBitrates};
