//! Playback session state

use serde::{Deserialize, Serialize};

use crate::domain::challenge::{Challenge, MAX_PROGRESS};
use crate::domain::shared::value_objects::SessionId;

/// Playback controller state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No resource held
    #[default]
    Idle,
    /// Acquisition in flight
    Loading,
    /// Resource held and playing
    Playing,
    /// Resource held, not playing (paused, stopped or finished)
    Paused,
    /// Last engine call failed; no resource held
    Error,
}

impl PlayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Loading => "loading",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Error => "error",
        }
    }
}

/// Observable state of the current playback session
///
/// Snapshots of this struct are what observers see. The resource handle
/// itself is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub track: Option<Challenge>,
    pub state: PlayerState,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub is_playing: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl PlaybackSession {
    /// A session with nothing loaded
    pub fn idle() -> Self {
        Self {
            id: SessionId::new(),
            track: None,
            state: PlayerState::Idle,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            is_playing: false,
            loading: false,
            last_error: None,
        }
    }

    /// A fresh session for `track`, waiting on acquisition
    pub fn loading(track: Challenge) -> Self {
        Self {
            track: Some(track),
            state: PlayerState::Loading,
            loading: true,
            ..Self::idle()
        }
    }

    /// Position as a percentage of the known duration, clamped to [0, 100]
    pub fn progress_percent(&self) -> Option<f64> {
        if self.duration_seconds > 0.0 {
            Some((self.position_seconds / self.duration_seconds * MAX_PROGRESS).clamp(0.0, MAX_PROGRESS))
        } else {
            None
        }
    }

    /// Title of the loaded track, if any
    pub fn title(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.title.as_str())
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::idle()
    }
}
