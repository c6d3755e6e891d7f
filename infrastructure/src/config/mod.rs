//! Configuration file loading for rethink
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `RETHINK_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./rethink.toml` or `./.rethink.toml`
//! 4. Global: `$XDG_CONFIG_HOME/rethink/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBehaviorConfig, FileConfig, FileModelsConfig, FileOutputConfig,
    FileProviderConfig, FileReplConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
