pub mod batch;
pub mod config;
pub mod encoder;
pub mod policy;
pub mod probe;
pub mod replacer;
pub mod testing;

pub use batch::{
    discover, BatchConfig, BatchError, BatchReport, BatchRunner, FileError, FileOutcome,
    FilePipeline, FileStage, FileTask, RunMode,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use encoder::{Encoder, EncoderConfig, EncoderError, FfmpegEncoder};
pub use policy::{plan, EncodePlan, PolicyEngine, PolicyError, RewriteTargets, SkipGateThresholds};
pub use probe::{FfprobeProber, MediaProfile, ProbeError, Prober};
pub use replacer::{FsReplacer, ReplaceError, Replacer};
