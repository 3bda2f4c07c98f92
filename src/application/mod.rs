//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases:
//! - Holding the challenge catalog and writing it through to storage
//! - Dispatching tracker side effects to the store and the reward ledger
//! - Exposing playback operations as one service

pub mod challenge_store;
pub mod dispatcher;
pub mod playback_service;

pub use challenge_store::{CatalogSummary, ChallengeStore};
pub use dispatcher::EffectDispatcher;
pub use playback_service::PlaybackService;
