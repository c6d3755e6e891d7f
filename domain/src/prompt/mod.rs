//! Instruction templates for the capability units.

pub mod template;

pub use template::RethinkPrompts;
