//! Effect trait definition
//!
//! Lifecycle seam between a host and a processor: `prepare` once per
//! stream configuration, `process` once per block, `release` on stop.

use crate::config::ProcessConfig;
use crate::engine::AudioBuffer;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Identity common to all effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectParams {
    /// Unique identifier for this effect instance
    pub id: String,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Base trait for real-time effects
///
/// `process` runs on the audio thread: it must not block, allocate, lock
/// or fail. Anything that can fail belongs in `prepare`.
pub trait Effect: Send {
    /// Per-block parameter values
    type Params;

    /// Size and zero all internal state for a stream configuration
    ///
    /// Idempotent; called again whenever the host configuration changes.
    fn prepare(&mut self, config: &ProcessConfig) -> Result<()>;

    /// Process a block in place; output overwrites input
    fn process(&mut self, buffer: &mut AudioBuffer, params: &Self::Params);

    /// Zero internal state without reallocating
    fn reset(&mut self);

    /// Free internal state
    fn release(&mut self);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;

    /// Get the unique instance ID
    fn id(&self) -> &str;

    /// Set the unique instance ID
    fn set_id(&mut self, id: String);

    /// Added latency in samples
    fn latency_samples(&self) -> usize {
        0
    }

    /// Seconds of output after the input goes silent
    fn tail_secs(&self) -> f64 {
        0.0
    }
}

/// Helper macro to implement common Effect trait methods
#[macro_export]
macro_rules! impl_effect_common {
    ($effect_type:expr, $display_name:expr) => {
        fn effect_type(&self) -> &'static str {
            $effect_type
        }

        fn display_name(&self) -> &str {
            $display_name
        }

        fn id(&self) -> &str {
            &self.params.id
        }

        fn set_id(&mut self, id: String) {
            self.params.id = id;
        }
    };
}
