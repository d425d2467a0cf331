//! Audio Engine Module
//!
//! Host-facing audio block types.

pub mod buffer;

pub use buffer::{db_to_linear, linear_to_db, AudioBuffer, DEFAULT_SAMPLE_RATE};
