//! Interactive chat module
//!
//! Provides a line-editor based interactive interface.

mod repl;

pub use repl::ChatRepl;
