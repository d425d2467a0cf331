//! Peak filter
//!
//! Second-order peaking EQ designed with the Audio EQ Cookbook formulas
//! (gain given as a linear factor) and run in transposed direct form II.
//! Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html

use std::f64::consts::PI;

/// Lowest center frequency used for coefficient design
pub const MIN_CENTER_HZ: f64 = 2.0;

/// Highest center frequency used for coefficient design, as a fraction of the sample rate
pub const MAX_CENTER_RATIO: f64 = 0.49;

/// History values below this are flushed to zero
const DENORMAL_THRESHOLD: f64 = 1e-15;

/// Normalized biquad coefficients (a0 == 1)
///
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl PeakCoefficients {
    /// Unity passthrough
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a peaking filter
    ///
    /// `gain_factor` is linear: 1.0 is flat, above 1.0 boosts around the
    /// center. The center is held inside `[MIN_CENTER_HZ, MAX_CENTER_RATIO * sample_rate]`.
    pub fn peak(sample_rate: f64, frequency: f64, q: f64, gain_factor: f64) -> Self {
        let frequency = frequency.max(MIN_CENTER_HZ).min(sample_rate * MAX_CENTER_RATIO);
        let a = gain_factor.max(0.0).sqrt();
        let omega = 2.0 * PI * frequency / sample_rate;
        let alpha = 0.5 * omega.sin() / q;
        let c2 = -2.0 * omega.cos();
        let alpha_times_a = alpha * a;
        let alpha_over_a = alpha / a;

        let a0 = 1.0 + alpha_over_a;
        Self {
            b0: (1.0 + alpha_times_a) / a0,
            b1: c2 / a0,
            b2: (1.0 - alpha_times_a) / a0,
            a1: c2 / a0,
            a2: (1.0 - alpha_over_a) / a0,
        }
    }

    /// Magnitude response (linear) at a frequency
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = 1.0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }

    /// Both poles inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }
}

impl Default for PeakCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Single-channel peak filter holding its own history
///
/// Never share one instance between channels: the history would mix.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakFilter {
    coeffs: PeakCoefficients,
    s1: f64,
    s2: f64,
}

impl PeakFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the coefficients, keeping the history
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: PeakCoefficients) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn coefficients(&self) -> &PeakCoefficients {
        &self.coeffs
    }

    /// Filter one sample
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let x = input as f64;
        let y = c.b0 * x + self.s1;
        self.s1 = flush_denormal(c.b1 * x - c.a1 * y + self.s2);
        self.s2 = flush_denormal(c.b2 * x - c.a2 * y);
        y as f32
    }

    /// Clear the history
    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

#[inline]
fn flush_denormal(value: f64) -> f64 {
    if value.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        value
    }
}
