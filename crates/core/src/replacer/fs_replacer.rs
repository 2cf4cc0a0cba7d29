//! File system replacer implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, error, warn};

use super::config::ReplacerConfig;
use super::error::ReplaceError;
use super::traits::Replacer;
use super::types::{unique_sibling, CommitResult, WorkFileKind};

/// File system based replacer implementation.
pub struct FsReplacer {
    config: ReplacerConfig,
}

impl FsReplacer {
    /// Creates a new replacer with the given configuration.
    pub fn new(config: ReplacerConfig) -> Self {
        Self { config }
    }

    /// Creates a replacer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ReplacerConfig::default())
    }

    /// Calculates the SHA-256 of a file.
    async fn calculate_checksum(&self, path: &Path) -> Result<String, ReplaceError> {
        let map_err = |e| ReplaceError::ChecksumCalculationFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::open(path).await.map_err(map_err)?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut hasher = Sha256::new();

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(map_err)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Moves the current target aside. Returns the backup path, or `None`
    /// when there was nothing to back up.
    async fn backup_original(target: &Path) -> Result<Option<PathBuf>, ReplaceError> {
        if fs::symlink_metadata(target).await.is_err() {
            return Ok(None);
        }

        let backup = unique_sibling(target, WorkFileKind::Backup);
        fs::rename(target, &backup)
            .await
            .map_err(|error| ReplaceError::BackupFailed {
                target: target.to_path_buf(),
                backup: backup.clone(),
                error,
            })?;

        debug!(target = %target.display(), backup = %backup.display(), "Original moved aside");
        Ok(Some(backup))
    }

    /// Checks the promoted target against the checksum taken from the temp
    /// file. On mismatch the promotion is undone before the error is returned.
    async fn verify_promoted(
        &self,
        target: &Path,
        expected: Option<String>,
        backup: Option<&Path>,
    ) -> Result<Option<String>, ReplaceError> {
        let Some(expected) = expected else {
            return Ok(None);
        };

        let actual = match self.calculate_checksum(target).await {
            Ok(actual) => actual,
            Err(e) => {
                Self::undo_promotion(target, backup).await?;
                return Err(e);
            }
        };
        if actual == expected {
            return Ok(Some(actual));
        }

        Self::undo_promotion(target, backup).await?;
        Err(ReplaceError::ChecksumMismatch {
            path: target.to_path_buf(),
            expected,
            actual,
        })
    }

    /// Moves the backup back over an unverified target, or removes the target
    /// when there was no original.
    async fn undo_promotion(target: &Path, backup: Option<&Path>) -> Result<(), ReplaceError> {
        let Some(backup) = backup else {
            if let Err(e) = fs::remove_file(target).await {
                warn!(target = %target.display(), error = %e, "Failed to remove unverified output");
            }
            return Ok(());
        };

        if let Err(error) = fs::rename(backup, target).await {
            error!(
                target = %target.display(),
                backup = %backup.display(),
                "Verification and restore failed, original kept at backup path"
            );
            return Err(ReplaceError::RestoreFailed {
                target: target.to_path_buf(),
                backup: backup.to_path_buf(),
                error,
            });
        }

        warn!(target = %target.display(), "Verification failed, original restored");
        Ok(())
    }

    /// Puts a backup back in place after a failed promotion.
    async fn restore_backup(
        target: &Path,
        backup: &Path,
        cause: std::io::Error,
        temp: &Path,
    ) -> ReplaceError {
        match fs::rename(backup, target).await {
            Ok(()) => {
                warn!(target = %target.display(), "Promotion failed, original restored");
                ReplaceError::PromoteFailed {
                    temp: temp.to_path_buf(),
                    target: target.to_path_buf(),
                    error: cause,
                }
            }
            Err(error) => {
                error!(
                    target = %target.display(),
                    backup = %backup.display(),
                    "Promotion and restore failed, original kept at backup path"
                );
                ReplaceError::RestoreFailed {
                    target: target.to_path_buf(),
                    backup: backup.to_path_buf(),
                    error,
                }
            }
        }
    }
}

#[async_trait]
impl Replacer for FsReplacer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn commit(&self, target: &Path, temp: &Path) -> Result<CommitResult, ReplaceError> {
        if !temp.exists() {
            return Err(ReplaceError::TempMissing {
                path: temp.to_path_buf(),
            });
        }

        let expected = if self.config.verify_checksum {
            Some(self.calculate_checksum(temp).await?)
        } else {
            None
        };

        let backup = Self::backup_original(target).await?;

        if let Err(cause) = fs::rename(temp, target).await {
            return Err(match &backup {
                Some(backup) => Self::restore_backup(target, backup, cause, temp).await,
                None => ReplaceError::PromoteFailed {
                    temp: temp.to_path_buf(),
                    target: target.to_path_buf(),
                    error: cause,
                },
            });
        }

        let checksum = self
            .verify_promoted(target, expected, backup.as_deref())
            .await?;

        if let Some(backup) = &backup {
            if let Err(e) = fs::remove_file(backup).await {
                // The new content is in place and verified; a stray backup is only clutter.
                warn!(backup = %backup.display(), error = %e, "Failed to remove backup");
            }
        }

        let size_bytes = fs::metadata(target).await?.len();
        debug!(target = %target.display(), size_bytes, "Committed");

        Ok(CommitResult {
            target: target.to_path_buf(),
            size_bytes,
            replaced_existing: backup.is_some(),
            checksum,
        })
    }

    async fn discard(&self, temp: &Path) -> Result<(), ReplaceError> {
        match fs::remove_file(temp).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReplaceError::Io(e)),
        }
    }
}
