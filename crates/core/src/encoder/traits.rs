//! Trait definitions for the encoder module.

use async_trait::async_trait;

use super::error::EncoderError;
use super::types::{EncodeRequest, EncodeResult};

/// An encoder that re-encodes a file into a temporary output.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Re-encodes `request.input_path` into `request.output_path`.
    ///
    /// Must not touch the input. On failure the output path should not be
    /// left behind.
    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncoderError>;
}
