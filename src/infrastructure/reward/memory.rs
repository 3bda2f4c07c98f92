//! In-memory reward ledger

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::reward::RewardLedger;
use crate::domain::shared::value_objects::ChallengeId;

#[derive(Debug, Default)]
struct LedgerState {
    completed: Vec<ChallengeId>,
    points: u64,
}

/// Ledger keeping completions and the point balance in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryRewardLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed challenge ids, in the order they were recorded
    pub async fn completed(&self) -> Vec<ChallengeId> {
        self.state.read().await.completed.clone()
    }

    pub async fn total_points(&self) -> u64 {
        self.state.read().await.points
    }
}

#[async_trait]
impl RewardLedger for InMemoryRewardLedger {
    async fn complete_challenge(&self, id: &ChallengeId) {
        self.state.write().await.completed.push(id.clone());
    }

    async fn add_points(&self, points: u32) {
        let mut state = self.state.write().await;
        state.points = state.points.saturating_add(u64::from(points));
        info!(points, balance = state.points, "Points awarded");
    }
}
