//! Trait definitions for the replacer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ReplaceError;
use super::types::CommitResult;

/// Promotes finished encodes onto their target paths.
#[async_trait]
pub trait Replacer: Send + Sync {
    /// Returns the name of this replacer implementation.
    fn name(&self) -> &str;

    /// Replaces `target` with `temp`. On success `temp` no longer exists.
    async fn commit(&self, target: &Path, temp: &Path) -> Result<CommitResult, ReplaceError>;

    /// Removes a temp file that will not be committed.
    async fn discard(&self, temp: &Path) -> Result<(), ReplaceError>;
}
