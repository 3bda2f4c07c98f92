//! Challenge domain events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::value_objects::ChallengeId;

/// A challenge transitioned to completed and its reward was issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCompleted {
    pub challenge_id: ChallengeId,
    pub points: u32,
    pub occurred_at: DateTime<Utc>,
}

impl ChallengeCompleted {
    pub fn new(challenge_id: ChallengeId, points: u32) -> Self {
        Self {
            challenge_id,
            points,
            occurred_at: Utc::now(),
        }
    }
}
