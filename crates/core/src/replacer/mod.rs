//! Replacer module for promoting a finished encode over its target.
//!
//! A commit never leaves zero valid copies of a file:
//!
//! 1. the existing target is renamed to a unique backup next to it;
//! 2. the temporary encode is renamed onto the target path;
//! 3. the backup is deleted.
//!
//! If step 2 fails the backup is renamed back. All renames stay inside one
//! directory, so each step is atomic on the same filesystem.
//!
//! # Example
//!
//! ```ignore
//! use vidnorm_core::replacer::{FsReplacer, Replacer};
//!
//! let replacer = FsReplacer::with_defaults();
//! let result = replacer.commit(Path::new("/videos/clip.mp4"), &temp_path).await?;
//! println!("Committed {} bytes", result.size_bytes);
//! ```

mod config;
mod error;
mod fs_replacer;
mod traits;
mod types;

pub use config::ReplacerConfig;
pub use error::ReplaceError;
pub use fs_replacer::FsReplacer;
pub use traits::Replacer;
pub use types::{is_work_file, unique_sibling, CommitResult, WorkFileKind};
