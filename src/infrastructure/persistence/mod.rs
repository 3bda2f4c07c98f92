//! Persistence implementations

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileChallengeRepository;
pub use memory::InMemoryChallengeRepository;
