use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::encoder::EncoderConfig;
use crate::policy::RewriteTargets;
use crate::probe::ProbeConfig;
use crate::replacer::ReplacerConfig;

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: RewriteTargets,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub replacer: ReplacerConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}
