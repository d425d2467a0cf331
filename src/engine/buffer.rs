//! Audio Buffer Management
//!
//! Host-facing block buffer: deinterleaved 32-bit float channels, processed
//! in place. Output overwrites input in the same storage.

use crate::error::{EnvFilterError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Sample rate used when none is specified
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Level reported for silence
pub const SILENCE_DB: f32 = f32::NEG_INFINITY;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        SILENCE_DB
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Deinterleaved audio block
///
/// Each channel is a separate `Vec<f32>` of equal length.
///
/// # Example
/// ```
/// use envfilter::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::new(2, 512, 48000.0);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 512);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    sample_rate: f64,
}

impl AudioBuffer {
    /// Create a zeroed buffer
    pub fn new(num_channels: usize, num_samples: usize, sample_rate: f64) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
            sample_rate,
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// All channels must have the same length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<Self> {
        if let Some(first) = channels.first() {
            let expected = first.len();
            if let Some((index, channel)) = channels
                .iter()
                .enumerate()
                .find(|(_, ch)| ch.len() != expected)
            {
                return Err(EnvFilterError::InvalidConfig {
                    reason: format!(
                        "channel {} has {} samples, expected {}",
                        index,
                        channel.len(),
                        expected
                    ),
                });
            }
        }

        Ok(Self {
            samples: channels,
            sample_rate,
        })
    }

    /// Create a buffer from interleaved sample data
    pub fn from_interleaved(
        interleaved: &[f32],
        num_channels: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if num_channels == 0 || interleaved.len() % num_channels != 0 {
            return Err(EnvFilterError::InvalidConfig {
                reason: format!(
                    "interleaved length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_samples = self.num_samples();
        let mut interleaved = Vec::with_capacity(self.num_channels() * num_samples);
        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }
        interleaved
    }

    /// Number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Samples of one channel
    #[inline]
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.samples.get(channel).map(|ch| ch.as_slice())
    }

    /// Mutable samples of one channel
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        self.samples.get_mut(channel).map(|ch| ch.as_mut_slice())
    }

    /// Iterate mutably over all channels in order
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.samples.iter_mut().map(|ch| ch.as_mut_slice())
    }

    /// Get a sample at the given channel and index
    pub fn get(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples.get(channel)?.get(index).copied()
    }

    /// Set a sample at the given channel and index; out-of-range writes are ignored
    pub fn set(&mut self, channel: usize, index: usize, value: f32) {
        if let Some(sample) = self
            .samples
            .get_mut(channel)
            .and_then(|ch| ch.get_mut(index))
        {
            *sample = value;
        }
    }

    /// Check that every sample is finite
    pub fn is_valid(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }

    /// Peak absolute level of a channel (linear)
    pub fn peak(&self, channel: usize) -> f32 {
        self.channel(channel)
            .map(|ch| ch.iter().map(|s| s.abs()).fold(0.0_f32, f32::max))
            .unwrap_or(0.0)
    }

    /// RMS level of a channel (linear)
    pub fn rms(&self, channel: usize) -> f32 {
        match self.channel(channel) {
            Some(ch) if !ch.is_empty() => {
                let sum_sq: f64 = ch.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (sum_sq / ch.len() as f64).sqrt() as f32
            }
            _ => 0.0,
        }
    }

    /// RMS level of a channel in dB
    pub fn rms_db(&self, channel: usize) -> f32 {
        linear_to_db(self.rms(channel))
    }
}
