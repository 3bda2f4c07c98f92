//! JSON file challenge repository
//!
//! Stores the catalog as a single pretty-printed JSON array. Writes go to a
//! sibling temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::challenge::{Challenge, ChallengeRepository};
use crate::domain::shared::Result;

pub struct JsonFileChallengeRepository {
    path: PathBuf,
}

impl JsonFileChallengeRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ChallengeRepository for JsonFileChallengeRepository {
    async fn load(&self) -> Result<Vec<Challenge>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No catalog file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, challenges: &[Challenge]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(challenges)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), count = challenges.len(), "Catalog saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::DomainError;
    use chrono::Utc;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("earmark-test-{}", Uuid::new_v4()))
            .join("catalog.json")
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let repo = JsonFileChallengeRepository::new(scratch_path());
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order_and_progress() {
        let path = scratch_path();
        let repo = JsonFileChallengeRepository::new(&path);

        let mut first = Challenge::new("b", "Second Title", "X", "asset://b.mp3", 5);
        first.update_progress(12.5);
        let mut second = Challenge::new("a", "First Title", "Y", "asset://a.mp3", 7);
        second.mark_complete(Utc::now());

        repo.save(&[first.clone(), second.clone()]).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded, vec![first, second]);
        assert!(!repo.temp_path().exists());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = scratch_path();
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let repo = JsonFileChallengeRepository::new(&path);
        let result = repo.load().await;
        assert!(matches!(result, Err(DomainError::Persistence(_))));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
