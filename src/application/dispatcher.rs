//! Side-effect dispatch
//!
//! Applies the effects produced by the progress tracker to the challenge
//! store and the reward ledger, in the order they were produced.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::challenge_store::ChallengeStore;
use crate::domain::challenge::ChallengeCompleted;
use crate::domain::playback::SideEffect;
use crate::domain::reward::RewardLedger;
use crate::domain::shared::value_objects::ChallengeId;

pub struct EffectDispatcher {
    store: Arc<ChallengeStore>,
    ledger: Arc<dyn RewardLedger>,
}

impl EffectDispatcher {
    pub fn new(store: Arc<ChallengeStore>, ledger: Arc<dyn RewardLedger>) -> Self {
        Self { store, ledger }
    }

    /// Apply `effects` and return the completions they produced.
    ///
    /// A reward is only paid when the `MarkComplete` preceding it in the same
    /// batch actually completed the challenge, so re-finishing a completed
    /// track never pays twice.
    pub async fn dispatch(&self, effects: Vec<SideEffect>) -> Vec<ChallengeCompleted> {
        let mut newly_completed: HashSet<ChallengeId> = HashSet::new();
        let mut completions = Vec::new();

        for effect in effects {
            match effect {
                SideEffect::UpdateProgress { id, progress } => {
                    self.store.update_progress(&id, progress).await;
                }
                SideEffect::MarkComplete { id } => {
                    if self.store.mark_complete(&id).await {
                        newly_completed.insert(id);
                    }
                }
                SideEffect::NotifyReward { id, points } => {
                    if !newly_completed.remove(&id) {
                        debug!(challenge_id = %id, "Reward already issued; skipping");
                        continue;
                    }
                    self.ledger.complete_challenge(&id).await;
                    self.ledger.add_points(points).await;
                    metrics::counter!("earmark_challenges_completed_total").increment(1);
                    info!(challenge_id = %id, points, "Reward issued");
                    completions.push(ChallengeCompleted::new(id, points));
                }
            }
        }

        completions
    }
}
