//! Audio engine adapters

pub mod simulated;

pub use simulated::{SimulatedAudioEngine, SimulatedEngineConfig, SimulatedResource};
