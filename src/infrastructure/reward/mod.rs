//! Reward ledger implementations

pub mod memory;

pub use memory::InMemoryRewardLedger;
