//! In-memory challenge repository

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::challenge::{Challenge, ChallengeRepository};
use crate::domain::shared::Result;

/// Repository keeping the persisted catalog in memory
///
/// Useful when no storage is configured and in tests; counts writes so
/// callers can check write-through behaviour.
#[derive(Default)]
pub struct InMemoryChallengeRepository {
    document: Arc<RwLock<Vec<Challenge>>>,
    saves: AtomicUsize,
}

impl InMemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-seeded with a persisted catalog
    pub fn with_challenges(challenges: Vec<Challenge>) -> Self {
        Self {
            document: Arc::new(RwLock::new(challenges)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    async fn load(&self) -> Result<Vec<Challenge>> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, challenges: &[Challenge]) -> Result<()> {
        *self.document.write().await = challenges.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
