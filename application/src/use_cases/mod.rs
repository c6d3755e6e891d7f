//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod consume_stream;
pub mod run_rethink;
