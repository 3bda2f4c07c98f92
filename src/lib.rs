//! Earmark - listening challenges with audio playback
//!
//! Domain-Driven Design implementation of a playback controller that turns
//! audio engine status notifications into challenge progress and rewards.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::shared::error::{DomainError, Result};
