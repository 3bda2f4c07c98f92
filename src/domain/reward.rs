//! Reward ledger port
//!
//! Points and completion records live in an external ledger. The core only
//! notifies it; nothing it returns is consumed.

use async_trait::async_trait;

use crate::domain::shared::value_objects::ChallengeId;

/// Receiver of completion rewards
#[async_trait]
pub trait RewardLedger: Send + Sync {
    /// Record that `id` has been completed
    async fn complete_challenge(&self, id: &ChallengeId);

    /// Credit `points` to the listener
    async fn add_points(&self, points: u32);
}
