//! Helpers for tests that need a real chain on disk
//!
//! Every helper works in a fresh temporary directory and mines at a low
//! difficulty so tests stay fast.

pub mod test_utils;

pub use test_utils::*;
