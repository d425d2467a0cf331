//! Per-block parameter snapshot

use serde::{Deserialize, Serialize};

use super::layout::{bool_to_value, value_to_bool, ParamId, ParamKind};
use crate::error::{EnvFilterError, Result};

/// Parameter values read once at the start of an audio block
///
/// Immutable for the duration of the block. Times are in seconds,
/// frequencies in Hz, gain is a linear factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSnapshot {
    /// Linear peak gain (1.0 to 30.0)
    pub gain_factor: f32,
    /// Resonance (0.1 to 10.0)
    pub q_factor: f32,
    /// Wet proportion (0.0 = dry, 1.0 = fully filtered)
    pub dry_wet_mix: f32,
    /// Attack time in seconds (0.001 to 0.050)
    pub attack_time: f32,
    /// Release time in seconds (0.050 to 0.500)
    pub release_time: f32,
    /// Center frequency at zero envelope, in Hz (50 to 2000)
    pub band_start: f32,
    /// Center frequency swing at unit envelope, in Hz (50 to 10000)
    pub band_width: f32,
    /// Skip all processing
    pub bypass: bool,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            gain_factor: 6.0,
            q_factor: 3.0,
            dry_wet_mix: 1.0,
            attack_time: 0.001,
            release_time: 0.080,
            band_start: 250.0,
            band_width: 1000.0,
            bypass: false,
        }
    }
}

impl ParameterSnapshot {
    /// Read a field as a plain value (bypass as 0.0 / 1.0)
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Gain => self.gain_factor,
            ParamId::Q => self.q_factor,
            ParamId::DryWetMix => self.dry_wet_mix,
            ParamId::AttackTime => self.attack_time,
            ParamId::ReleaseTime => self.release_time,
            ParamId::BandStart => self.band_start,
            ParamId::BandWidth => self.band_width,
            ParamId::Bypass => bool_to_value(self.bypass),
        }
    }

    /// Write a field from a plain value without range checks
    pub fn set(&mut self, id: ParamId, value: f32) {
        match id {
            ParamId::Gain => self.gain_factor = value,
            ParamId::Q => self.q_factor = value,
            ParamId::DryWetMix => self.dry_wet_mix = value,
            ParamId::AttackTime => self.attack_time = value,
            ParamId::ReleaseTime => self.release_time = value,
            ParamId::BandStart => self.band_start = value,
            ParamId::BandWidth => self.band_width = value,
            ParamId::Bypass => self.bypass = value_to_bool(value),
        }
    }

    /// Check every field against the layout ranges
    pub fn validate(&self) -> Result<()> {
        for id in ParamId::ALL {
            let info = id.info();
            let value = self.get(id);
            if !info.kind.accepts(value) {
                let expected = match info.kind {
                    ParamKind::Continuous { range, .. } => {
                        format!("{} to {}", range.min, range.max)
                    }
                    ParamKind::Choice { options, .. } => options.join(", "),
                    ParamKind::Boolean { .. } => "true or false".to_string(),
                };
                return Err(EnvFilterError::InvalidParameter {
                    param: id.to_string(),
                    value: value.to_string(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Copy with every field forced into its legal range
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for id in ParamId::ALL {
            out.set(id, id.info().kind.clamp(self.get(id)));
        }
        out
    }
}
