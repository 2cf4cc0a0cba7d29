//! Recursive discovery of candidate videos.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::BatchError;
use crate::replacer::is_work_file;

/// Finds every regular file under `root` whose extension matches
/// `extension` (case-insensitive).
///
/// Symlinks are not followed and scratch files left by an earlier run are
/// ignored. Entries that cannot be read are logged and skipped. The result
/// is sorted so runs are reproducible.
pub fn discover(root: &Path, extension: &str) -> Result<Vec<PathBuf>, BatchError> {
    if !root.exists() {
        return Err(BatchError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(BatchError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root);
                warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted));

        if !matches || is_work_file(path) {
            continue;
        }

        match path.canonicalize() {
            Ok(canonical) => files.push(canonical),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unresolvable file"),
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "Discovered files");
    Ok(files)
}
