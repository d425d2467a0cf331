//! Lock-free parameter store
//!
//! Shared between the editor/host threads (writers) and the audio thread
//! (reader). Values are kept as `f32` bits in atomics so the audio thread
//! can take a [`ParameterSnapshot`] without locking or allocating.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, warn};

use super::layout::{ParamId, PARAMETERS};
use super::snapshot::ParameterSnapshot;
use crate::error::Result;

/// Thread-safe store holding the current plain value of every parameter
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; 8],
}

impl ParamStore {
    /// Create a store holding the layout defaults
    pub fn new() -> Self {
        Self::from_snapshot(&ParameterSnapshot::default())
    }

    /// Create a store from a snapshot, clamping out-of-range fields
    pub fn from_snapshot(snapshot: &ParameterSnapshot) -> Self {
        let clamped = snapshot.clamped();
        Self {
            values: ParamId::ALL.map(|id| AtomicU32::new(clamped.get(id).to_bits())),
        }
    }

    /// Current plain value of a parameter
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Store a plain value, clamped to the parameter's legal set
    ///
    /// Returns the value actually stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let stored = id.info().kind.clamp(value);
        if stored != value {
            warn!(param = %id, requested = value, stored, "parameter value clamped");
        }
        self.values[id.index()].store(stored.to_bits(), Ordering::Relaxed);
        stored
    }

    /// Store a value addressed by its host-facing id string
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<f32> {
        let id: ParamId = name.parse()?;
        Ok(self.set(id, value))
    }

    /// Current value mapped to 0..1
    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.info().kind.normalize(self.get(id))
    }

    /// Store a value given in 0..1
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        self.set(id, id.info().kind.denormalize(normalized))
    }

    /// Restore every parameter to its default
    pub fn reset_to_defaults(&self) {
        for info in PARAMETERS.iter() {
            self.values[info.id.index()].store(info.kind.default_value().to_bits(), Ordering::Relaxed);
        }
        debug!("parameters reset to defaults");
    }

    /// Read all values at once for one audio block
    ///
    /// Safe to call from the audio thread: atomic loads only.
    #[inline]
    pub fn snapshot(&self) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::default();
        for id in ParamId::ALL {
            snapshot.set(id, self.get(id));
        }
        snapshot
    }

    /// Overwrite every parameter from a snapshot, clamping as needed
    pub fn apply(&self, snapshot: &ParameterSnapshot) {
        for id in ParamId::ALL {
            self.set(id, snapshot.get(id));
        }
    }

    /// Serialize the current state as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Restore state from JSON
    ///
    /// The store is left untouched when the document does not parse.
    pub fn restore_json(&self, json: &str) -> Result<()> {
        let snapshot: ParameterSnapshot = serde_json::from_str(json).map_err(|e| {
            warn!(error = %e, "ignoring invalid parameter state");
            e
        })?;
        self.apply(&snapshot);
        debug!("parameter state restored");
        Ok(())
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults() {
        let store = ParamStore::new();
        assert_eq!(store.snapshot(), ParameterSnapshot::default());
        assert_eq!(store.get(ParamId::BandStart), 250.0);
    }

    #[test]
    fn test_set_clamps() {
        let store = ParamStore::new();
        assert_eq!(store.set(ParamId::AttackTime, 0.0), 0.001);
        assert_eq!(store.set(ParamId::Q, 12.0), 10.0);
        assert_eq!(store.set(ParamId::Bypass, 0.9), 1.0);
        assert!(store.snapshot().bypass);
    }

    #[test]
    fn test_set_by_name() {
        let store = ParamStore::new();
        assert_eq!(store.set_by_name("Band Width", 3000.0).unwrap(), 3000.0);
        assert_eq!(store.snapshot().band_width, 3000.0);
        assert!(store.set_by_name("Drive", 1.0).is_err());
    }

    #[test]
    fn test_normalized_access() {
        let store = ParamStore::new();
        store.set_normalized(ParamId::ReleaseTime, 1.0);
        assert_relative_eq!(store.get(ParamId::ReleaseTime), 0.5);
        assert_relative_eq!(store.get_normalized(ParamId::ReleaseTime), 1.0);
    }

    #[test]
    fn test_json_state_roundtrip() {
        let store = ParamStore::new();
        store.set(ParamId::Gain, 12.0);
        store.set(ParamId::Bypass, 1.0);
        let json = store.to_json().unwrap();

        let restored = ParamStore::new();
        restored.restore_json(&json).unwrap();
        assert_eq!(restored.snapshot(), store.snapshot());
    }

    #[test]
    fn test_invalid_json_leaves_state() {
        let store = ParamStore::new();
        store.set(ParamId::Q, 7.0);
        assert!(store.restore_json("{ not json").is_err());
        assert_eq!(store.get(ParamId::Q), 7.0);
    }

    #[test]
    fn test_reset_to_defaults() {
        let store = ParamStore::new();
        store.set(ParamId::DryWetMix, 0.3);
        store.reset_to_defaults();
        assert_eq!(store.snapshot(), ParameterSnapshot::default());
    }

    #[test]
    fn test_concurrent_reader_sees_legal_values() {
        let store = Arc::new(ParamStore::new());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..1000 {
                    store.set(ParamId::BandStart, 50.0 + i as f32);
                }
            })
        };

        for _ in 0..1000 {
            assert!(store.snapshot().validate().is_ok());
        }
        writer.join().unwrap();
        assert_eq!(store.get(ParamId::BandStart), 1049.0);
    }
}
