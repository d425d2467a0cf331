//! Parameters
//!
//! Layout, per-block snapshot and the lock-free store the audio thread
//! reads from.

mod layout;
mod snapshot;
mod store;

pub use layout::{FloatRange, ParamId, ParamInfo, ParamKind, Unit, PARAMETERS};
pub use snapshot::ParameterSnapshot;
pub use store::ParamStore;
