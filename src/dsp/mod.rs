//! DSP Library
//!
//! Envelope follower, peak filter and the envelope filter effect that
//! combines them. All processors implement the `Effect` trait.

mod effect;
mod envelope;
mod envelope_filter;
mod peak_filter;

pub use effect::{Effect, EffectParams};
pub use envelope::{follow, smoothing_coeff, Ballistics, EnvelopeFollower};
pub use envelope_filter::EnvelopeFilter;
pub use peak_filter::{PeakCoefficients, PeakFilter, MAX_CENTER_RATIO, MIN_CENTER_HZ};
