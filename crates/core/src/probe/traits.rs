//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;
use super::types::MediaProfile;

/// Reads the current encoding parameters of a media file.
///
/// Implementations must be read-only: probing never modifies the file.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Probes a media file.
    async fn probe(&self, path: &Path) -> Result<MediaProfile, ProbeError>;

    /// Validates that the prober is properly configured and ready.
    async fn validate(&self) -> Result<(), ProbeError>;
}
