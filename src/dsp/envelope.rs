//! Envelope follower
//!
//! One-pole asymmetric peak detector. The envelope rises with the attack
//! coefficient while the input exceeds it and falls with the release
//! coefficient otherwise.

/// One-pole smoothing coefficient for a time constant
///
/// `exp(-1 / (time * sample_rate))`. The time must be strictly positive;
/// the parameter layout guarantees a floor of 1 ms.
#[inline]
pub fn smoothing_coeff(time_secs: f32, sample_rate: f32) -> f32 {
    (-1.0 / (time_secs * sample_rate)).exp()
}

/// Attack/release coefficient pair for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ballistics {
    pub attack: f32,
    pub release: f32,
}

impl Ballistics {
    /// Derive both coefficients from time constants in seconds
    #[inline]
    pub fn new(attack_secs: f32, release_secs: f32, sample_rate: f32) -> Self {
        Self {
            attack: smoothing_coeff(attack_secs, sample_rate),
            release: smoothing_coeff(release_secs, sample_rate),
        }
    }
}

/// Advance an envelope by one sample
#[inline]
pub fn follow(envelope: f32, input: f32, ballistics: Ballistics) -> f32 {
    let level = input.abs();
    let coeff = if level > envelope {
        ballistics.attack
    } else {
        ballistics.release
    };
    coeff * envelope + (1.0 - coeff) * level
}

/// Single-channel envelope follower
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeFollower {
    value: f32,
}

impl EnvelopeFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; returns the updated envelope
    ///
    /// Coefficients are derived on every call so parameter changes apply
    /// from the very next sample.
    #[inline]
    pub fn process(&mut self, input: f32, attack_secs: f32, release_secs: f32, sample_rate: f32) -> f32 {
        let ballistics = Ballistics::new(attack_secs, release_secs, sample_rate);
        self.value = follow(self.value, input, ballistics);
        self.value
    }

    /// Current envelope
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SR: f32 = 48000.0;

    #[test]
    fn test_coefficient_time_constant() {
        // After `time * sr` samples a step has covered 1 - 1/e of the distance
        let coeff = smoothing_coeff(0.010, SR);
        let remaining = coeff.powi(480);
        assert_relative_eq!(remaining, (-1.0_f32).exp(), epsilon = 1e-4);
    }

    #[test]
    fn test_coefficient_grows_with_sample_rate() {
        assert!(smoothing_coeff(0.010, 96000.0) > smoothing_coeff(0.010, 44100.0));
    }

    #[test]
    fn test_attack_branch_rises() {
        let mut env = EnvelopeFollower::new();
        let mut previous = 0.0;
        for _ in 0..100 {
            let value = env.process(0.8, 0.001, 0.080, SR);
            assert!(value >= previous);
            assert!(value <= 0.8);
            previous = value;
        }
    }

    #[test]
    fn test_release_branch_falls() {
        let mut env = EnvelopeFollower::new();
        for _ in 0..4800 {
            env.process(1.0, 0.001, 0.080, SR);
        }
        let peak = env.value();
        let mut previous = peak;
        for _ in 0..100 {
            let value = env.process(0.0, 0.001, 0.080, SR);
            assert!(value <= previous);
            previous = value;
        }
        assert!(previous < peak);
    }

    #[test]
    fn test_negative_input_uses_magnitude() {
        let mut pos = EnvelopeFollower::new();
        let mut neg = EnvelopeFollower::new();
        for _ in 0..64 {
            pos.process(0.5, 0.005, 0.1, SR);
            neg.process(-0.5, 0.005, 0.1, SR);
        }
        assert_eq!(pos.value(), neg.value());
    }

    #[test]
    fn test_reset() {
        let mut env = EnvelopeFollower::new();
        env.process(1.0, 0.001, 0.05, SR);
        assert!(env.value() > 0.0);
        env.reset();
        assert_eq!(env.value(), 0.0);
    }
}
