//! Application-level configuration.
//!
//! - [`ExecutionParams`] — round loop control (iterations, threading fallback)

pub mod execution_params;

pub use execution_params::ExecutionParams;
