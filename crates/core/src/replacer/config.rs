//! Configuration for the replacer module.

use serde::{Deserialize, Serialize};

/// Configuration for the file system replacer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacerConfig {
    /// Whether to verify the committed bytes against the temp file.
    #[serde(default)]
    pub verify_checksum: bool,

    /// Buffer size for checksum reads in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_buffer_size() -> usize {
    8 * 1024 * 1024 // 8 MB
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            verify_checksum: false,
            buffer_size: default_buffer_size(),
        }
    }
}

impl ReplacerConfig {
    /// Enables checksum verification.
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    /// Sets the buffer size for checksum reads.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}
