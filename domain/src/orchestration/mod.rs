//! Orchestration domain.
//!
//! - [`entities::RethinkRun`] — the run state machine and iteration counter
//! - [`value_objects`] — budget, per-round and per-run results
//! - [`threading::RoundStateThreader`] — carries state from one round to the next

pub mod entities;
pub mod threading;
pub mod value_objects;
