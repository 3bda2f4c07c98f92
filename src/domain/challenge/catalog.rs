//! Built-in default catalog
//!
//! Used when the persisted catalog is empty or cannot be read.

use crate::domain::challenge::entity::Challenge;

/// The catalog shipped with the application
pub fn default_catalog() -> Vec<Challenge> {
    vec![
        Challenge::new(
            "ch-001",
            "Morning Breath",
            "Calm Collective",
            "asset://challenges/morning-breath.mp3",
            10,
        ),
        Challenge::new(
            "ch-002",
            "Focus Flow",
            "Deep Work Sessions",
            "asset://challenges/focus-flow.mp3",
            15,
        ),
        Challenge::new(
            "ch-003",
            "Evening Wind-Down",
            "Calm Collective",
            "asset://challenges/evening-wind-down.mp3",
            20,
        ),
        Challenge::new(
            "ch-004",
            "Gratitude Walk",
            "Open Air",
            "asset://challenges/gratitude-walk.mp3",
            25,
        ),
    ]
}
