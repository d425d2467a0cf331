//! Envelope filter
//!
//! Envelope-following dynamic peak filter. Each channel tracks its own
//! amplitude envelope, and every sample the envelope moves the center of
//! that channel's peak filter:
//!
//! ```text
//! fc = band_start + band_width * envelope
//! ```
//!
//! The filtered signal is blended with the dry input by the mix ratio.
//! Coefficients are redesigned on every sample because the center frequency
//! follows the signal itself.

use tracing::{debug, info, warn};

use super::effect::{Effect, EffectParams};
use super::envelope::EnvelopeFollower;
use super::peak_filter::{PeakCoefficients, PeakFilter};
use crate::config::ProcessConfig;
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::impl_effect_common;
use crate::params::ParameterSnapshot;

/// Per-channel state: one envelope and one filter, always together
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    envelope: EnvelopeFollower,
    filter: PeakFilter,
}

/// Envelope-following dynamic peak filter
///
/// # Example
/// ```
/// use envfilter::config::ProcessConfig;
/// use envfilter::dsp::{Effect, EnvelopeFilter};
/// use envfilter::engine::AudioBuffer;
/// use envfilter::params::ParameterSnapshot;
///
/// let mut filter = EnvelopeFilter::new();
/// filter.prepare(&ProcessConfig::new(48000.0, 256, 2)).unwrap();
///
/// let mut buffer = AudioBuffer::new(2, 256, 48000.0);
/// filter.process(&mut buffer, &ParameterSnapshot::default());
/// assert!(buffer.is_valid());
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFilter {
    params: EffectParams,
    sample_rate: f64,
    max_block_size: usize,
    /// Sized exactly at prepare; never grown on the audio thread
    channels: Box<[ChannelState]>,
    /// Blocks whose channel count differed from the prepared count
    mismatched_blocks: u64,
}

impl EnvelopeFilter {
    /// Create an unprepared filter; processing is a passthrough until `prepare`
    pub fn new() -> Self {
        Self {
            params: EffectParams::default(),
            sample_rate: crate::engine::DEFAULT_SAMPLE_RATE,
            max_block_size: 0,
            channels: Box::new([]),
            mismatched_blocks: 0,
        }
    }

    /// Instantaneous center frequency for an envelope value
    #[inline]
    pub fn center_frequency(band_start: f32, band_width: f32, envelope: f32) -> f32 {
        band_start + band_width * envelope
    }

    /// Number of channels state was prepared for
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn is_prepared(&self) -> bool {
        !self.channels.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Current envelope of a channel
    pub fn envelope(&self, channel: usize) -> Option<f32> {
        self.channels.get(channel).map(|state| state.envelope.value())
    }

    /// Coefficients most recently applied to a channel's filter
    pub fn coefficients(&self, channel: usize) -> Option<PeakCoefficients> {
        self.channels
            .get(channel)
            .map(|state| *state.filter.coefficients())
    }

    /// Count of blocks processed with a channel count other than the prepared one
    pub fn mismatched_blocks(&self) -> u64 {
        self.mismatched_blocks
    }

    /// Process deinterleaved channels in place
    ///
    /// Channels are paired with prepared state in order. Extra buffer
    /// channels pass through untouched; extra state is left idle.
    /// Real-time safe: no allocation, locking or logging.
    pub fn process_channels<'a, I>(&mut self, channels: I, params: &ParameterSnapshot)
    where
        I: IntoIterator<Item = &'a mut [f32]>,
    {
        if params.bypass {
            return;
        }

        let sample_rate = self.sample_rate;
        let envelope_rate = sample_rate as f32;
        let q = params.q_factor as f64;
        let gain = params.gain_factor as f64;
        let mix = params.dry_wet_mix;

        let mut buffers = channels.into_iter();
        let mut mismatched = false;

        for state in self.channels.iter_mut() {
            let Some(data) = buffers.next() else {
                mismatched = true;
                break;
            };

            for sample in data.iter_mut() {
                let input = *sample;
                if !input.is_finite() {
                    continue;
                }

                let envelope =
                    state
                        .envelope
                        .process(input, params.attack_time, params.release_time, envelope_rate);
                let fc = Self::center_frequency(params.band_start, params.band_width, envelope);
                state
                    .filter
                    .set_coefficients(PeakCoefficients::peak(sample_rate, fc as f64, q, gain));

                let mut filtered = state.filter.process_sample(input);
                if !filtered.is_finite() {
                    state.filter.reset();
                    filtered = input;
                }

                *sample = filtered * mix + input * (1.0 - mix);
            }
        }

        if buffers.next().is_some() {
            mismatched = true;
        }
        if mismatched && self.is_prepared() {
            self.mismatched_blocks += 1;
        }
    }

    fn report_mismatches(&mut self) {
        if self.mismatched_blocks > 0 {
            warn!(
                blocks = self.mismatched_blocks,
                prepared_channels = self.channels.len(),
                "buffers did not match the prepared channel count"
            );
            self.mismatched_blocks = 0;
        }
    }
}

impl Default for EnvelopeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for EnvelopeFilter {
    type Params = ParameterSnapshot;

    impl_effect_common!("envelope-filter", "Envelope Filter");

    fn prepare(&mut self, config: &ProcessConfig) -> Result<()> {
        config.validate()?;
        self.report_mismatches();

        self.sample_rate = config.sample_rate;
        self.max_block_size = config.max_block_size;
        self.channels = vec![ChannelState::default(); config.channel_count].into_boxed_slice();

        info!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            channels = config.channel_count,
            "envelope filter prepared"
        );
        Ok(())
    }

    fn process(&mut self, buffer: &mut AudioBuffer, params: &ParameterSnapshot) {
        self.process_channels(buffer.channels_mut(), params);
    }

    fn reset(&mut self) {
        for state in self.channels.iter_mut() {
            state.envelope.reset();
            state.filter.reset();
        }
        debug!("envelope filter state reset");
    }

    fn release(&mut self) {
        self.report_mismatches();
        self.channels = Box::new([]);
        debug!("envelope filter released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const SR: f64 = 48000.0;

    fn prepared(channels: usize) -> EnvelopeFilter {
        let mut filter = EnvelopeFilter::new();
        filter
            .prepare(&ProcessConfig::new(SR, 512, channels))
            .unwrap();
        filter
    }

    fn sine(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn test_center_frequency_formula() {
        assert_eq!(EnvelopeFilter::center_frequency(250.0, 1000.0, 0.0), 250.0);
        assert_eq!(EnvelopeFilter::center_frequency(250.0, 1000.0, 0.5), 750.0);
        assert_eq!(EnvelopeFilter::center_frequency(250.0, 1000.0, 1.0), 1250.0);
    }

    #[test]
    fn test_prepare_sizes_state() {
        let filter = prepared(3);
        assert_eq!(filter.num_channels(), 3);
        assert!(filter.is_prepared());
        assert_eq!(filter.envelope(2), Some(0.0));
        assert_eq!(filter.envelope(3), None);
    }

    #[test]
    fn test_prepare_rejects_bad_config() {
        let mut filter = EnvelopeFilter::new();
        assert!(filter.prepare(&ProcessConfig::new(0.0, 512, 2)).is_err());
        assert!(!filter.is_prepared());
    }

    #[test]
    fn test_prepare_is_idempotent_and_zeroes() {
        let mut filter = prepared(2);
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.9; 256]; 2], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());
        assert!(filter.envelope(0).unwrap() > 0.0);

        filter.prepare(&ProcessConfig::new(SR, 512, 2)).unwrap();
        assert_eq!(filter.envelope(0), Some(0.0));
        assert_eq!(filter.coefficients(0), Some(PeakCoefficients::IDENTITY));
    }

    #[test]
    fn test_coefficients_follow_envelope() {
        let mut filter = prepared(1);
        let params = ParameterSnapshot::default();
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.5; 2048]], SR).unwrap();
        filter.process(&mut buffer, &params);

        let envelope = filter.envelope(0).unwrap();
        let fc = EnvelopeFilter::center_frequency(params.band_start, params.band_width, envelope);
        let expected = PeakCoefficients::peak(SR, fc as f64, 3.0, 6.0);
        assert_eq!(filter.coefficients(0), Some(expected));
    }

    #[test]
    fn test_bypass_keeps_state() {
        let mut filter = prepared(1);
        let mut buffer = AudioBuffer::from_channels(vec![sine(440.0, 0.8, 512)], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());
        let envelope = filter.envelope(0).unwrap();

        let bypassed = ParameterSnapshot {
            bypass: true,
            ..Default::default()
        };
        let mut loud = AudioBuffer::from_channels(vec![vec![1.0; 512]], SR).unwrap();
        filter.process(&mut loud, &bypassed);
        assert_eq!(filter.envelope(0), Some(envelope));
    }

    #[test]
    fn test_reset_zeroes_without_reallocating() {
        let mut filter = prepared(2);
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.7; 128]; 2], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());

        filter.reset();
        assert_eq!(filter.num_channels(), 2);
        assert_eq!(filter.envelope(0), Some(0.0));
        assert_eq!(filter.envelope(1), Some(0.0));
    }

    #[test]
    fn test_extra_buffer_channels_pass_through() {
        let mut filter = prepared(1);
        let extra = sine(300.0, 0.5, 256);
        let mut buffer =
            AudioBuffer::from_channels(vec![sine(300.0, 0.5, 256), extra.clone()], SR).unwrap();

        filter.process(&mut buffer, &ParameterSnapshot::default());

        assert_eq!(buffer.channel(1), Some(extra.as_slice()));
        assert_ne!(buffer.channel(0), Some(extra.as_slice()));
        assert_eq!(filter.mismatched_blocks(), 1);
    }

    #[test]
    fn test_fewer_buffer_channels() {
        let mut filter = prepared(2);
        let mut buffer = AudioBuffer::from_channels(vec![vec![0.5; 64]], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());

        assert!(filter.envelope(0).unwrap() > 0.0);
        assert_eq!(filter.envelope(1), Some(0.0));
        assert_eq!(filter.mismatched_blocks(), 1);
    }

    #[test]
    fn test_unprepared_is_passthrough() {
        let mut filter = EnvelopeFilter::new();
        let input = sine(1000.0, 0.9, 128);
        let mut buffer = AudioBuffer::from_channels(vec![input.clone()], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());
        assert_eq!(buffer.channel(0), Some(input.as_slice()));
        assert_eq!(filter.mismatched_blocks(), 0);
    }

    #[test]
    fn test_release_then_prepare() {
        let mut filter = prepared(2);
        filter.release();
        assert!(!filter.is_prepared());

        let input = sine(500.0, 0.5, 64);
        let mut buffer = AudioBuffer::from_channels(vec![input.clone(); 2], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());
        assert_eq!(buffer.channel(0), Some(input.as_slice()));

        filter.prepare(&ProcessConfig::new(SR, 64, 2)).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());
        assert_ne!(buffer.channel(0), Some(input.as_slice()));
    }

    #[test]
    fn test_non_finite_input_passes_through() {
        let mut filter = prepared(1);
        let mut buffer =
            AudioBuffer::from_channels(vec![vec![0.5, f32::NAN, f32::INFINITY, 0.5]], SR).unwrap();
        filter.process(&mut buffer, &ParameterSnapshot::default());

        let out = buffer.channel(0).unwrap();
        assert!(out[1].is_nan());
        assert_eq!(out[2], f32::INFINITY);
        assert!(out[3].is_finite());
        assert!(filter.envelope(0).unwrap().is_finite());
    }

    #[test]
    fn test_half_mix_blends() {
        let input = sine(800.0, 0.6, 1024);

        let mut wet_filter = prepared(1);
        let mut wet = AudioBuffer::from_channels(vec![input.clone()], SR).unwrap();
        wet_filter.process(&mut wet, &ParameterSnapshot::default());

        let mut half_filter = prepared(1);
        let half_params = ParameterSnapshot {
            dry_wet_mix: 0.5,
            ..Default::default()
        };
        let mut half = AudioBuffer::from_channels(vec![input.clone()], SR).unwrap();
        half_filter.process(&mut half, &half_params);

        for i in 0..input.len() {
            let expected = 0.5 * wet.get(0, i).unwrap() + 0.5 * input[i];
            assert_relative_eq!(half.get(0, i).unwrap(), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_effect_identity() {
        let mut filter = EnvelopeFilter::new();
        assert_eq!(filter.effect_type(), "envelope-filter");
        assert_eq!(filter.display_name(), "Envelope Filter");
        assert!(!filter.id().is_empty());
        filter.set_id("wah-1".to_string());
        assert_eq!(filter.id(), "wah-1");
        assert_eq!(filter.latency_samples(), 0);
        assert_eq!(filter.tail_secs(), 0.0);
    }
}
