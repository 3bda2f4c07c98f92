//! Challenge repository interface

use crate::domain::challenge::entity::Challenge;
use crate::domain::shared::Result;
use async_trait::async_trait;

/// Repository interface for the challenge catalog
///
/// The catalog is persisted as one ordered document; there is no
/// per-record access. Live playback state is never persisted.
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Load the persisted catalog. An absent document yields an empty list.
    async fn load(&self) -> Result<Vec<Challenge>>;

    /// Replace the persisted catalog with `challenges`
    async fn save(&self, challenges: &[Challenge]) -> Result<()>;
}
