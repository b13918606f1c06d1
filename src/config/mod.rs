//! Configuration management
//!
//! Storage locations and mining difficulty, read from the environment.

pub mod settings;

pub use settings::{Config, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
