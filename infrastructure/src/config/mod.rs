//! Configuration file loading for casefile
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CASEFILE_` environment variables (`CASEFILE_SERVER__BASE_URL`, ...)
//! 2. `--config <path>` specified file
//! 3. Project root: `./casefile.toml` or `./.casefile.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/casefile/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, FileConfig, FileGameConfig, FileLoggingConfig,
    FileOutputConfig, FileServerConfig, Severity,
};
pub use loader::ConfigLoader;
