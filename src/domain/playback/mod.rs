//! Playback bounded context
//!
//! - [`engine`]: port to the external audio engine
//! - [`session`]: observable playback session state
//! - [`tracker`]: status notification → session state + side effects
//! - [`controller`]: single-resource lifecycle state machine

pub mod controller;
pub mod engine;
pub mod session;
pub mod tracker;

pub use controller::{PlaybackController, StatusNotification};
pub use engine::{AudioEngine, AudioResource, EngineError, PlaybackStatus, StatusCallback};
pub use session::{PlaybackSession, PlayerState};
pub use tracker::{ProgressTracker, SideEffect, TrackerOutcome};
