//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Entities: challenges and their progress
//! - Value Objects: identifiers and generations
//! - Domain Services: playback controller and progress tracker
//! - Ports: audio engine, challenge repository, reward ledger
//! - Domain Events: things that happened in the domain

pub mod challenge;
pub mod playback;
pub mod reward;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
