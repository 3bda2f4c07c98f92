//! Challenge entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::value_objects::ChallengeId;

/// Upper bound for stored progress, in percent
pub const MAX_PROGRESS: f64 = 100.0;

/// A playable catalog track with reward and progress fields
///
/// Serialized in the persisted catalog document as
/// `{ id, title, artist, uri, points, progress, completed, completedAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub artist: String,
    #[serde(rename = "uri")]
    pub audio_uri: String,
    pub points: u32,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// Create a fresh, unplayed challenge
    pub fn new(
        id: impl Into<ChallengeId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_uri: impl Into<String>,
        points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            audio_uri: audio_uri.into(),
            points,
            progress: 0.0,
            completed: false,
            completed_at: None,
        }
    }

    /// Record listening progress.
    ///
    /// Only the upper bound is enforced here; negative values are stored
    /// as given and clamped by whoever displays them.
    pub fn update_progress(&mut self, progress: f64) {
        self.progress = progress.min(MAX_PROGRESS);
    }

    /// Mark the challenge complete at `now`.
    ///
    /// Returns `false` without touching anything if it was already complete.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.progress = MAX_PROGRESS;
        self.completed_at = Some(now);
        true
    }

    /// Progress clamped to [0, 100] for display
    pub fn display_progress(&self) -> f64 {
        self.progress.clamp(0.0, MAX_PROGRESS)
    }
}
