//! Progress tracking
//!
//! Turns raw engine status notifications into session state and the side
//! effects they imply. Nothing here touches the store, the ledger or the
//! engine: callers get a list of effects back and decide how to apply them.

use serde::{Deserialize, Serialize};

use crate::domain::challenge::MAX_PROGRESS;
use crate::domain::playback::engine::PlaybackStatus;
use crate::domain::playback::session::PlaybackSession;
use crate::domain::shared::value_objects::ChallengeId;

/// A change the tracker wants applied outside the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    UpdateProgress { id: ChallengeId, progress: f64 },
    MarkComplete { id: ChallengeId },
    NotifyReward { id: ChallengeId, points: u32 },
}

/// Result of applying one status notification
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerOutcome {
    pub session: PlaybackSession,
    pub effects: Vec<SideEffect>,
}

/// Stateless progress tracker
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker;

impl ProgressTracker {
    pub fn new() -> Self {
        Self
    }

    /// Apply `status` to `session`.
    ///
    /// The status is assumed to belong to the resource currently backing
    /// `session`; filtering stale notifications is the caller's job.
    pub fn apply(&self, session: &PlaybackSession, status: &PlaybackStatus) -> TrackerOutcome {
        let mut next = session.clone();
        let mut effects = Vec::new();

        // Resource still preparing: nothing to derive yet.
        if !status.is_loaded {
            return TrackerOutcome {
                session: next,
                effects,
            };
        }

        next.duration_seconds = match status.duration_ms {
            Some(ms) if ms > 0 => ms as f64 / 1000.0,
            _ => session.duration_seconds,
        };
        next.position_seconds = status.position_ms as f64 / 1000.0;
        if next.duration_seconds > 0.0 {
            next.position_seconds = next.position_seconds.min(next.duration_seconds);
        }
        next.is_playing = status.is_playing;

        let Some(track) = session.track.as_ref() else {
            return TrackerOutcome {
                session: next,
                effects,
            };
        };

        if next.duration_seconds > 0.0 {
            let progress =
                (next.position_seconds / next.duration_seconds * MAX_PROGRESS).clamp(0.0, MAX_PROGRESS);
            effects.push(SideEffect::UpdateProgress {
                id: track.id.clone(),
                progress,
            });
        }

        if status.just_finished {
            effects.push(SideEffect::MarkComplete {
                id: track.id.clone(),
            });
            effects.push(SideEffect::NotifyReward {
                id: track.id.clone(),
                points: track.points,
            });
            next.is_playing = false;
        }

        TrackerOutcome {
            session: next,
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::challenge::Challenge;
    use crate::domain::playback::session::PlayerState;

    fn session_for(points: u32) -> PlaybackSession {
        let track = Challenge::new("t1", "Morning Focus", "Lumen", "asset://f.mp3", points);
        let mut session = PlaybackSession::loading(track);
        session.state = PlayerState::Playing;
        session.loading = false;
        session
    }

    #[test]
    fn test_unloaded_status_is_ignored() {
        let session = session_for(10);
        let outcome = ProgressTracker::new().apply(&session, &PlaybackStatus::unloaded());
        assert_eq!(outcome.session, session);
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_start_of_track() {
        let session = session_for(10);
        let status = PlaybackStatus::loaded(0, Some(200_000), true);
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(outcome.session.position_seconds, 0.0);
        assert_eq!(outcome.session.duration_seconds, 200.0);
        assert!(outcome.session.is_playing);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::UpdateProgress {
                id: ChallengeId::from("t1"),
                progress: 0.0
            }]
        );
    }

    #[test]
    fn test_finish_emits_completion_and_reward() {
        let session = session_for(10);
        let status = PlaybackStatus::loaded(200_000, Some(200_000), true).finished();
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert!(!outcome.session.is_playing);
        assert_eq!(
            outcome.effects,
            vec![
                SideEffect::UpdateProgress {
                    id: ChallengeId::from("t1"),
                    progress: 100.0
                },
                SideEffect::MarkComplete {
                    id: ChallengeId::from("t1")
                },
                SideEffect::NotifyReward {
                    id: ChallengeId::from("t1"),
                    points: 10
                },
            ]
        );
    }

    #[test]
    fn test_missing_duration_reuses_previous() {
        let mut session = session_for(10);
        session.duration_seconds = 100.0;

        let status = PlaybackStatus::loaded(25_000, None, true);
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(outcome.session.duration_seconds, 100.0);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::UpdateProgress {
                id: ChallengeId::from("t1"),
                progress: 25.0
            }]
        );
    }

    #[test]
    fn test_zero_duration_keeps_known_duration() {
        let mut session = session_for(10);
        session.duration_seconds = 200.0;

        let status = PlaybackStatus::loaded(50_000, Some(0), true);
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(outcome.session.duration_seconds, 200.0);
        assert_eq!(outcome.session.position_seconds, 50.0);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::UpdateProgress {
                id: ChallengeId::from("t1"),
                progress: 25.0
            }]
        );
    }

    #[test]
    fn test_missing_duration_without_history_emits_nothing() {
        let session = session_for(10);
        let status = PlaybackStatus::loaded(5_000, None, true);
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(outcome.session.duration_seconds, 0.0);
        assert_eq!(outcome.session.position_seconds, 5.0);
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_position_clamped_to_duration() {
        let session = session_for(10);
        let status = PlaybackStatus::loaded(250_000, Some(200_000), true);
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(outcome.session.position_seconds, 200.0);
        assert_eq!(
            outcome.effects,
            vec![SideEffect::UpdateProgress {
                id: ChallengeId::from("t1"),
                progress: 100.0
            }]
        );
    }

    #[test]
    fn test_finish_without_duration_still_completes() {
        let session = session_for(7);
        let status = PlaybackStatus::loaded(3_000, None, false).finished();
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert_eq!(
            outcome.effects,
            vec![
                SideEffect::MarkComplete {
                    id: ChallengeId::from("t1")
                },
                SideEffect::NotifyReward {
                    id: ChallengeId::from("t1"),
                    points: 7
                },
            ]
        );
    }

    #[test]
    fn test_status_without_track_only_moves_position() {
        let session = PlaybackSession::idle();
        let status = PlaybackStatus::loaded(1_000, Some(2_000), true).finished();
        let outcome = ProgressTracker::new().apply(&session, &status);

        assert!(outcome.effects.is_empty());
        assert_eq!(outcome.session.position_seconds, 1.0);
        assert!(outcome.session.is_playing);
    }
}
