//! Types for the replacer module.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Marker embedded in every temporary or backup file name.
const WORK_FILE_MARKER: &str = ".vidnorm-";

/// Kind of short-lived file created next to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkFileKind {
    /// Encoder output waiting to be committed.
    Temp,
    /// Original moved aside during a commit.
    Backup,
}

impl WorkFileKind {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Temp => "tmp",
            Self::Backup => "bak",
        }
    }
}

/// Returns a hidden path next to `target`, unique per process and call.
///
/// Shape: `.<file name>.vidnorm-<pid>-<uuid>.<tmp|bak>`.
pub fn unique_sibling(target: &Path, kind: WorkFileKind) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    let name = format!(
        ".{}{}{}-{}.{}",
        file_name,
        WORK_FILE_MARKER,
        std::process::id(),
        Uuid::new_v4().simple(),
        kind.suffix()
    );

    match target.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Whether `path` is a temporary or backup file created by [`unique_sibling`].
pub fn is_work_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .is_some_and(|n| n.starts_with('.') && n.contains(WORK_FILE_MARKER))
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// Path now holding the new content.
    pub target: PathBuf,
    /// Size of the committed file in bytes.
    pub size_bytes: u64,
    /// Whether an existing file was replaced.
    pub replaced_existing: bool,
    /// SHA-256 of the committed content, when verification is enabled.
    pub checksum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sibling_shape() {
        let temp = unique_sibling(Path::new("/videos/a/clip.mp4"), WorkFileKind::Temp);
        assert_eq!(temp.parent(), Some(Path::new("/videos/a")));

        let name = temp.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".clip.mp4.vidnorm-"));
        assert!(name.contains(&std::process::id().to_string()));
        assert!(name.ends_with(".tmp"));

        let backup = unique_sibling(Path::new("clip.mp4"), WorkFileKind::Backup);
        assert!(backup.to_string_lossy().ends_with(".bak"));
    }

    #[test]
    fn test_unique_sibling_never_repeats() {
        let target = Path::new("/videos/clip.mp4");
        let a = unique_sibling(target, WorkFileKind::Temp);
        let b = unique_sibling(target, WorkFileKind::Temp);
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_work_file() {
        let temp = unique_sibling(Path::new("/videos/clip.mp4"), WorkFileKind::Temp);
        assert!(is_work_file(&temp));
        assert!(!is_work_file(Path::new("/videos/clip.mp4")));
        assert!(!is_work_file(Path::new("/videos/.hidden.mp4")));
    }
}
