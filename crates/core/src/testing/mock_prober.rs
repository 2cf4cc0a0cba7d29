//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MediaProfile, ProbeError, Prober};

use super::fixtures;

/// Mock implementation of the Prober trait.
///
/// Profiles and failures are keyed by file name, so tests do not depend
/// on how a temporary directory canonicalizes. Files not configured
/// explicitly get the default profile with their own path filled in.
#[derive(Debug, Clone)]
pub struct MockProber {
    default_profile: Arc<RwLock<MediaProfile>>,
    profiles: Arc<RwLock<HashMap<String, MediaProfile>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<PathBuf>>>,
}

impl Default for MockProber {
    fn default() -> Self {
        Self::oversized()
    }
}

impl MockProber {
    /// Creates a mock returning `profile` for every file.
    pub fn new(profile: MediaProfile) -> Self {
        Self {
            default_profile: Arc::new(RwLock::new(profile)),
            profiles: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every file needs a re-encode.
    pub fn oversized() -> Self {
        Self::new(fixtures::oversized_profile(""))
    }

    /// Every file passes the skip gate.
    pub fn compliant() -> Self {
        Self::new(fixtures::compliant_profile(""))
    }

    /// Sets the profile returned for `file_name`.
    pub async fn set_profile(&self, file_name: &str, profile: MediaProfile) {
        self.profiles
            .write()
            .await
            .insert(file_name.to_string(), profile);
    }

    /// Makes probing `file_name` fail as if ffprobe printed garbage.
    pub async fn fail_on(&self, file_name: &str) {
        self.failing.write().await.insert(file_name.to_string());
    }

    /// Paths probed so far, in call order.
    pub async fn probed_paths(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Prober for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaProfile, ProbeError> {
        self.calls.write().await.push(path.to_path_buf());

        if !path.exists() {
            return Err(ProbeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let name = Self::file_name(path);
        if self.failing.read().await.contains(&name) {
            return Err(ProbeError::decode(format!("unreadable stream data in {name}")));
        }

        let mut profile = match self.profiles.read().await.get(&name) {
            Some(profile) => profile.clone(),
            None => self.default_profile.read().await.clone(),
        };
        profile.path = path.to_path_buf();
        Ok(profile)
    }

    async fn validate(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_and_override_profiles() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let prober = MockProber::oversized();
        prober
            .set_profile("b.mp4", fixtures::compliant_profile(""))
            .await;

        assert_eq!(prober.probe(&a).await.unwrap().height, 1080);
        let profile = prober.probe(&b).await.unwrap();
        assert_eq!(profile.height, 360);
        assert_eq!(profile.path, b);
        assert_eq!(prober.probed_paths().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.mp4");
        std::fs::write(&bad, b"x").unwrap();

        let prober = MockProber::oversized();
        prober.fail_on("bad.mp4").await;

        assert!(matches!(
            prober.probe(&bad).await,
            Err(ProbeError::Decode { .. })
        ));
        assert!(matches!(
            prober.probe(&dir.path().join("gone.mp4")).await,
            Err(ProbeError::InputNotFound { .. })
        ));
    }
}
