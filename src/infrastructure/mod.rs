//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Audio engine adapters
//! - Challenge repository implementations
//! - Reward ledger implementations

pub mod audio;
pub mod persistence;
pub mod reward;
