//! Command-line arguments.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vidnorm",
    version,
    about = "Normalize videos to a bounded resolution, frame rate and bitrate",
    long_about = "Probes each video with ffprobe and re-encodes it with ffmpeg only when it \
                  exceeds the size bounds. With --all, every matching file under --dir is \
                  replaced in place."
)]
pub struct Cli {
    /// Process every matching file under --dir in place
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Source video (single-file mode)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Destination path (single-file mode)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Root directory for --all
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Process files one at a time
    #[arg(long, conflicts_with = "jobs")]
    pub sequential: bool,

    /// Number of files encoded at once (default: half the CPU cores)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every file under `root`, in place.
    All { root: PathBuf },
    /// One explicit input/output pair.
    Single { input: PathBuf, output: PathBuf },
}

impl Cli {
    /// Resolves the run target, rejecting argument combinations clap
    /// cannot express on its own.
    pub fn target(&self) -> Result<Target, clap::Error> {
        if self.jobs == Some(0) {
            return Err(usage_error(
                ErrorKind::InvalidValue,
                "--jobs must be at least 1",
            ));
        }

        if self.all {
            if self.input.is_some() || self.output.is_some() {
                return Err(usage_error(
                    ErrorKind::ArgumentConflict,
                    "--all processes files in place and takes no INPUT or OUTPUT",
                ));
            }
            return Ok(Target::All {
                root: self.dir.clone(),
            });
        }

        match (&self.input, &self.output) {
            (Some(input), Some(output)) => Ok(Target::Single {
                input: input.clone(),
                output: output.clone(),
            }),
            _ => Err(usage_error(
                ErrorKind::MissingRequiredArgument,
                "both INPUT and OUTPUT are required unless --all is given",
            )),
        }
    }
}

fn usage_error(kind: ErrorKind, message: &str) -> clap::Error {
    Cli::command().error(kind, message)
}
