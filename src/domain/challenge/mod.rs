//! Challenge bounded context
//!
//! A challenge is a catalog track plus its reward metadata and the
//! listening progress recorded against it.

pub mod catalog;
pub mod entity;
pub mod event;
pub mod repository;

pub use catalog::default_catalog;
pub use entity::{Challenge, MAX_PROGRESS};
pub use event::ChallengeCompleted;
pub use repository::ChallengeRepository;
