//! envfilter - Envelope-Following Dynamic Peak Filter
//!
//! An audio effect that tracks the amplitude envelope of each channel and
//! uses it to sweep the center frequency of a resonant peak filter applied
//! to the same signal, blended with the dry input.
//!
//! # Architecture
//!
//! - `params`: parameter layout, per-block snapshot, lock-free store
//! - `dsp`: envelope follower, peak filter, the `EnvelopeFilter` effect
//! - `engine`: host-facing audio buffers
//! - `config`: stream configuration and presets

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;

pub use error::{EnvFilterError, Result};
