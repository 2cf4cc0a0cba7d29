//! Threshold policy for deciding whether, and how, a file is re-encoded.
//!
//! The decision is two-tier:
//!
//! 1. A fixed, cheap [`SkipGateThresholds`] check together with the
//!    resolution and frame-rate caps of [`RewriteTargets`]. A file under
//!    every bound produces a no-op [`EncodePlan`].
//! 2. Otherwise each dimension (resolution, frame rate, audio sample rate,
//!    audio bitrate, video bitrate) is decided on its own.

mod engine;
mod error;
mod types;

pub use engine::{plan, PolicyEngine};
pub use error::PolicyError;
pub use types::{EncodePlan, RewriteTargets, SkipGateThresholds};
