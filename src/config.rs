//! Processing configuration and parameter presets

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::DEFAULT_SAMPLE_RATE;
use crate::error::{EnvFilterError, Result};
use crate::params::ParameterSnapshot;

/// Host stream configuration passed to `prepare`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Largest block the host will deliver
    pub max_block_size: usize,
    /// Number of channels to allocate state for
    pub channel_count: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: 512,
            channel_count: 2,
        }
    }
}

impl ProcessConfig {
    pub fn new(sample_rate: f64, max_block_size: usize, channel_count: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channel_count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EnvFilterError::InvalidConfig {
                reason: format!("sample rate must be positive, got {}", self.sample_rate),
            });
        }
        if self.max_block_size == 0 {
            return Err(EnvFilterError::InvalidConfig {
                reason: "max block size must be at least 1".to_string(),
            });
        }
        if self.channel_count == 0 {
            return Err(EnvFilterError::InvalidConfig {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load a parameter preset from a JSON file
///
/// Missing fields take their defaults; out-of-range fields are clamped.
pub fn load_preset(path: &Path) -> Result<ParameterSnapshot> {
    let text = fs::read_to_string(path)?;
    let snapshot: ParameterSnapshot = serde_json::from_str(&text)?;

    if let Err(e) = snapshot.validate() {
        warn!(path = %path.display(), error = %e, "preset out of range, clamping");
        return Ok(snapshot.clamped());
    }

    info!(path = %path.display(), "loaded preset");
    Ok(snapshot)
}

/// Write a parameter preset as pretty JSON
pub fn save_preset(path: &Path, snapshot: &ParameterSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "saved preset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProcessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        for config in [
            ProcessConfig::new(0.0, 512, 2),
            ProcessConfig::new(f64::NAN, 512, 2),
            ProcessConfig::new(48000.0, 0, 2),
            ProcessConfig::new(48000.0, 512, 0),
        ] {
            let err = config.validate().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_CONFIG");
        }
    }

    #[test]
    fn test_preset_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wah.json");
        let snapshot = ParameterSnapshot {
            gain_factor: 12.0,
            band_start: 400.0,
            bypass: true,
            ..Default::default()
        };

        save_preset(&path, &snapshot).unwrap();
        assert_eq!(load_preset(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_preset_clamps_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hot.json");
        fs::write(&path, r#"{ "attack_time": 0.0, "band_width": 50000.0 }"#).unwrap();

        let loaded = load_preset(&path).unwrap();
        assert_eq!(loaded.attack_time, 0.001);
        assert_eq!(loaded.band_width, 10000.0);
        assert_eq!(loaded.q_factor, 3.0);
    }

    #[test]
    fn test_missing_preset() {
        let dir = TempDir::new().unwrap();
        let err = load_preset(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
