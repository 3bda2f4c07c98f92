//! Challenge store
//!
//! In-memory catalog of challenges with write-through persistence.
//! Mutations land in memory first and are published to observers; the
//! repository write happens afterwards and its failures are only logged.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::domain::challenge::{default_catalog, Challenge, ChallengeRepository, MAX_PROGRESS};
use crate::domain::shared::value_objects::ChallengeId;

/// Aggregate figures over the catalog
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub completed: usize,
    pub points_earned: u32,
    pub points_available: u32,
    /// Mean displayed progress over all challenges, in percent
    pub overall_progress: f64,
}

pub struct ChallengeStore {
    challenges: RwLock<Vec<Challenge>>,
    repository: Arc<dyn ChallengeRepository>,
    observers: watch::Sender<Vec<Challenge>>,
}

impl ChallengeStore {
    /// Create a store over `challenges` without reading the repository
    pub fn new(repository: Arc<dyn ChallengeRepository>, challenges: Vec<Challenge>) -> Self {
        let (observers, _) = watch::channel(challenges.clone());
        Self {
            challenges: RwLock::new(challenges),
            repository,
            observers,
        }
    }

    /// Restore the catalog from `repository`.
    ///
    /// Falls back to the built-in catalog when nothing usable is persisted.
    pub async fn restore(repository: Arc<dyn ChallengeRepository>) -> Self {
        let challenges = match repository.load().await {
            Ok(challenges) if !challenges.is_empty() => {
                info!(count = challenges.len(), "Restored challenge catalog");
                challenges
            }
            Ok(_) => {
                info!("No persisted catalog; using defaults");
                default_catalog()
            }
            Err(err) => {
                warn!(error = %err, "Failed to read persisted catalog; using defaults");
                default_catalog()
            }
        };

        Self::new(repository, challenges)
    }

    /// Snapshot of the whole catalog, in catalog order
    pub async fn list(&self) -> Vec<Challenge> {
        self.challenges.read().await.clone()
    }

    pub async fn get(&self, id: &ChallengeId) -> Option<Challenge> {
        self.challenges
            .read()
            .await
            .iter()
            .find(|c| &c.id == id)
            .cloned()
    }

    /// First challenge not yet completed
    pub async fn next_incomplete(&self) -> Option<Challenge> {
        self.challenges
            .read()
            .await
            .iter()
            .find(|c| !c.completed)
            .cloned()
    }

    /// Watch the catalog; a new snapshot is published after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<Challenge>> {
        self.observers.subscribe()
    }

    /// Store `progress` for `id`, capped at 100. Unknown ids are ignored.
    pub async fn update_progress(&self, id: &ChallengeId, progress: f64) {
        let snapshot = {
            let mut challenges = self.challenges.write().await;
            let Some(challenge) = challenges.iter_mut().find(|c| &c.id == id) else {
                debug!(challenge_id = %id, "Progress update for unknown challenge ignored");
                return;
            };
            challenge.update_progress(progress);
            challenges.clone()
        };

        self.commit(snapshot).await;
    }

    /// Mark `id` complete.
    ///
    /// Returns `true` only for the call that actually flips it; unknown or
    /// already-completed challenges are left untouched.
    pub async fn mark_complete(&self, id: &ChallengeId) -> bool {
        let snapshot = {
            let mut challenges = self.challenges.write().await;
            let Some(challenge) = challenges.iter_mut().find(|c| &c.id == id) else {
                debug!(challenge_id = %id, "Completion for unknown challenge ignored");
                return false;
            };
            if !challenge.mark_complete(Utc::now()) {
                debug!(challenge_id = %id, "Challenge already completed");
                return false;
            }
            challenges.clone()
        };

        info!(challenge_id = %id, "Challenge completed");
        self.commit(snapshot).await;
        true
    }

    pub async fn summary(&self) -> CatalogSummary {
        let challenges = self.challenges.read().await;
        let total = challenges.len();
        let completed = challenges.iter().filter(|c| c.completed).count();
        let points_earned = challenges
            .iter()
            .filter(|c| c.completed)
            .map(|c| c.points)
            .sum();
        let points_available = challenges.iter().map(|c| c.points).sum();
        let overall_progress = if total > 0 {
            challenges.iter().map(|c| c.display_progress()).sum::<f64>() / total as f64
        } else {
            0.0
        };

        CatalogSummary {
            total,
            completed,
            points_earned,
            points_available,
            overall_progress: overall_progress.min(MAX_PROGRESS),
        }
    }

    async fn commit(&self, snapshot: Vec<Challenge>) {
        self.observers.send_replace(snapshot.clone());

        if let Err(err) = self.repository.save(&snapshot).await {
            metrics::counter!("earmark_persist_failures_total").increment(1);
            warn!(error = %err, "Failed to persist challenge catalog");
        }
    }
}
