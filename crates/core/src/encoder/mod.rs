//! Encoder module for re-encoding a file according to an [`EncodePlan`].
//!
//! The encoder only ever writes the temporary output path of a request;
//! the source file is left untouched. Promotion of the result is the
//! replacer's job.
//!
//! # Example
//!
//! ```ignore
//! use vidnorm_core::encoder::{EncodeRequest, Encoder, FfmpegEncoder};
//!
//! let encoder = FfmpegEncoder::with_defaults();
//! encoder.validate().await?;
//!
//! let request = EncodeRequest::new("/videos/clip.mp4", "/videos/.clip.mp4.tmp", plan);
//! let result = encoder.encode(&request).await?;
//! println!("Encoded in {} ms", result.duration_ms);
//! ```
//!
//! [`EncodePlan`]: crate::policy::EncodePlan

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncoderError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::Encoder;
pub use types::{AudioBitrateMode, AudioCodec, Container, EncodeRequest, EncodeResult, VideoCodec};
