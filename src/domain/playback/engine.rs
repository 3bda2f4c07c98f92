//! Audio engine port
//!
//! The engine that actually decodes and plays audio lives outside this crate.
//! These traits are the contract the playback controller depends on; the
//! infrastructure layer provides implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Raw status notification emitted by an audio resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// False while the engine is still preparing the resource
    pub is_loaded: bool,
    pub position_ms: u64,
    /// Absent until the engine has probed the track length
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    /// Terminal notification: playback reached the end of the track
    pub just_finished: bool,
}

impl PlaybackStatus {
    /// Status of a resource that is not usable yet
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Status of a loaded resource
    pub fn loaded(position_ms: u64, duration_ms: Option<u64>, is_playing: bool) -> Self {
        Self {
            is_loaded: true,
            position_ms,
            duration_ms,
            is_playing,
            just_finished: false,
        }
    }

    /// Mark this status as the end-of-track notification
    pub fn finished(mut self) -> Self {
        self.just_finished = true;
        self
    }
}

/// Callback receiving status notifications for one resource
pub type StatusCallback = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

/// Engine failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Failed to load {uri}: {reason}")]
    Load { uri: String, reason: String },

    #[error("{operation} failed: {reason}")]
    Control {
        operation: &'static str,
        reason: String,
    },

    #[error("Resource already released")]
    Released,
}

impl EngineError {
    pub fn load(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn control(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Control {
            operation,
            reason: reason.into(),
        }
    }
}

/// A live, engine-owned playable instance for one loaded track
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioResource: Send + Sync {
    async fn play(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    /// Jump to `position_ms`; the engine clamps to the track duration
    async fn seek(&self, position_ms: u64) -> Result<(), EngineError>;

    async fn stop(&self) -> Result<(), EngineError>;

    /// Release the resource. No notifications are delivered afterwards.
    async fn release(&self) -> Result<(), EngineError>;

    /// Register the status callback for this resource's lifetime
    fn subscribe(&self, callback: StatusCallback);
}

/// Factory for audio resources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Acquire a resource for `uri`, starting playback immediately if `autoplay`
    async fn acquire(&self, uri: &str, autoplay: bool)
        -> Result<Arc<dyn AudioResource>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_builders() {
        let status = PlaybackStatus::loaded(1_000, Some(5_000), true);
        assert!(status.is_loaded);
        assert!(!status.just_finished);

        let done = status.finished();
        assert!(done.just_finished);
        assert_eq!(done.position_ms, 1_000);

        assert!(!PlaybackStatus::unloaded().is_loaded);
    }

    #[test]
    fn test_engine_error_messages() {
        let err = EngineError::load("asset://x.mp3", "file missing");
        assert_eq!(err.to_string(), "Failed to load asset://x.mp3: file missing");

        let err = EngineError::control("pause", "device lost");
        assert_eq!(err.to_string(), "pause failed: device lost");
    }
}
