//! CLI Command Implementations

use std::path::Path;

use tracing::info;

use crate::config::load_preset;
use crate::dsp::{EnvelopeFilter, EnvelopeFollower, PeakCoefficients};
use crate::engine::linear_to_db;
use crate::error::{EnvFilterError, Result};
use crate::params::{ParamKind, ParameterSnapshot, PARAMETERS};

/// Longest step the envelope report will simulate, in seconds
const MAX_SIMULATED_SECS: f64 = 10.0;

/// One row of an envelope sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub envelope: f32,
    pub center_hz: f32,
    pub gain_db: f32,
}

/// Step response summary of the envelope follower
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeReport {
    /// Samples until the envelope reached 99% of the step
    pub attack_samples: usize,
    /// Envelope after one release time, relative to its starting level
    pub release_ratio: f32,
}

fn snapshot_from(preset: Option<&Path>) -> Result<ParameterSnapshot> {
    match preset {
        Some(path) => load_preset(path),
        None => Ok(ParameterSnapshot::default()),
    }
}

fn check_sample_rate(sample_rate: f64) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(EnvFilterError::InvalidConfig {
            reason: format!("sample rate must be positive, got {}", sample_rate),
        })
    }
}

/// Print the parameter layout.
pub fn list_params() -> Result<()> {
    println!("{:<14} {:<14} {:>22} {:>10}", "ID", "NAME", "RANGE", "DEFAULT");
    println!("{:-<63}", "");

    for info in PARAMETERS.iter() {
        let range = match info.kind {
            ParamKind::Continuous { range, .. } => format!(
                "{} .. {}",
                info.format_value(range.min),
                info.format_value(range.max)
            ),
            ParamKind::Choice { options, .. } => options.join(" | "),
            ParamKind::Boolean { .. } => "Off | On".to_string(),
        };
        println!(
            "{:<14} {:<14} {:>22} {:>10}",
            info.id.as_str(),
            info.name,
            range,
            info.format_value(info.kind.default_value())
        );
    }

    Ok(())
}

/// Center frequency and gain at center for evenly spaced envelope values.
pub fn sweep_points(params: &ParameterSnapshot, steps: usize, sample_rate: f64) -> Vec<SweepPoint> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let envelope = i as f32 / steps as f32;
            let center_hz =
                EnvelopeFilter::center_frequency(params.band_start, params.band_width, envelope);
            let coeffs = PeakCoefficients::peak(
                sample_rate,
                center_hz as f64,
                params.q_factor as f64,
                params.gain_factor as f64,
            );
            let gain = coeffs.magnitude_at(center_hz as f64, sample_rate) as f32;
            SweepPoint {
                envelope,
                center_hz,
                gain_db: linear_to_db(gain),
            }
        })
        .collect()
}

/// Print the envelope sweep.
pub fn sweep(steps: usize, sample_rate: f64, preset: Option<&Path>) -> Result<()> {
    check_sample_rate(sample_rate)?;
    let params = snapshot_from(preset)?;
    info!(steps, sample_rate, "sweeping envelope");

    println!("{:>9} {:>12} {:>12}", "ENVELOPE", "CENTER (Hz)", "GAIN (dB)");
    for point in sweep_points(&params, steps, sample_rate) {
        println!(
            "{:>9.2} {:>12.1} {:>12.2}",
            point.envelope, point.center_hz, point.gain_db
        );
    }
    Ok(())
}

/// Magnitude response in dB over log-spaced frequencies from 20 Hz to just below Nyquist.
pub fn response_points(
    params: &ParameterSnapshot,
    envelope: f32,
    points: usize,
    sample_rate: f64,
) -> Vec<(f64, f32)> {
    let points = points.max(2);
    let low = 20.0_f64;
    let high = sample_rate * 0.5 * 0.99;
    let center = EnvelopeFilter::center_frequency(params.band_start, params.band_width, envelope);
    let coeffs = PeakCoefficients::peak(
        sample_rate,
        center as f64,
        params.q_factor as f64,
        params.gain_factor as f64,
    );

    (0..points)
        .map(|i| {
            let t = i as f64 / (points - 1) as f64;
            let frequency = low * (high / low).powf(t);
            let magnitude = coeffs.magnitude_at(frequency, sample_rate) as f32;
            (frequency, linear_to_db(magnitude))
        })
        .collect()
}

/// Print the magnitude response.
pub fn response(envelope: f32, sample_rate: f64, points: usize, preset: Option<&Path>) -> Result<()> {
    check_sample_rate(sample_rate)?;
    let params = snapshot_from(preset)?;
    let center = EnvelopeFilter::center_frequency(params.band_start, params.band_width, envelope);
    info!(envelope, center_hz = center, "computing response");

    println!("Center frequency: {:.1} Hz", center);
    println!("{:>12} {:>10}", "FREQ (Hz)", "dB");
    for (frequency, db) in response_points(&params, envelope, points, sample_rate) {
        println!("{:>12.1} {:>10.2}", frequency, db);
    }
    Ok(())
}

/// Feed a step up and then down through a follower.
pub fn envelope_report(attack: f32, release: f32, amplitude: f32, sample_rate: f64) -> Result<EnvelopeReport> {
    check_sample_rate(sample_rate)?;
    for (name, value) in [("attack", attack), ("release", release)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(EnvFilterError::InvalidParameter {
                param: name.to_string(),
                value: value.to_string(),
                expected: "a positive time in seconds".to_string(),
            });
        }
    }

    let rate = sample_rate as f32;
    let limit = (MAX_SIMULATED_SECS * sample_rate) as usize;
    let target = amplitude.abs() * 0.99;
    let mut follower = EnvelopeFollower::new();

    let mut attack_samples = 0;
    while follower.value() < target && attack_samples < limit {
        follower.process(amplitude, attack, release, rate);
        attack_samples += 1;
    }

    let start = follower.value();
    let release_samples = (release as f64 * sample_rate).round() as usize;
    for _ in 0..release_samples {
        follower.process(0.0, attack, release, rate);
    }
    let release_ratio = if start > 0.0 {
        follower.value() / start
    } else {
        0.0
    };

    Ok(EnvelopeReport {
        attack_samples,
        release_ratio,
    })
}

/// Print the envelope step response.
pub fn envelope(attack: f32, release: f32, amplitude: f32, sample_rate: f64) -> Result<()> {
    let report = envelope_report(attack, release, amplitude, sample_rate)?;
    let attack_ms = report.attack_samples as f64 / sample_rate * 1000.0;

    println!(
        "Attack:  reached 99% of {} after {} samples ({:.2} ms)",
        amplitude, report.attack_samples, attack_ms
    );
    println!(
        "Release: {:.1}% of the level remains after {:.0} ms",
        report.release_ratio * 100.0,
        release * 1000.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sweep_points_span_band() {
        let points = sweep_points(&ParameterSnapshot::default(), 4, 48000.0);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].center_hz, 250.0);
        assert_eq!(points[2].center_hz, 750.0);
        assert_eq!(points[4].center_hz, 1250.0);
        for point in &points {
            assert_relative_eq!(point.gain_db, linear_to_db(6.0), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_response_peaks_near_center() {
        let points = response_points(&ParameterSnapshot::default(), 0.5, 200, 48000.0);
        let (peak_freq, _) = points
            .iter()
            .copied()
            .fold((0.0, f32::NEG_INFINITY), |best, p| if p.1 > best.1 { p } else { best });
        assert!((peak_freq - 750.0).abs() < 50.0, "peak at {}", peak_freq);
    }

    #[test]
    fn test_envelope_report() {
        let report = envelope_report(0.001, 0.080, 1.0, 48000.0).unwrap();
        // ln(100) time constants to reach 99%
        assert!((report.attack_samples as f64 - 48.0 * 4.605).abs() < 3.0);
        assert_relative_eq!(report.release_ratio, (-1.0_f32).exp(), epsilon = 1e-3);
    }

    #[test]
    fn test_envelope_report_rejects_zero_time() {
        assert!(envelope_report(0.0, 0.080, 1.0, 48000.0).is_err());
        assert!(envelope_report(0.001, 0.080, 1.0, 0.0).is_err());
    }
}
