//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

mod game;
mod logging;
mod output;
mod server;

pub use game::FileGameConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use server::FileServerConfig;

use serde::{Deserialize, Serialize};

/// How serious a configuration issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work at all.
    Error,
    /// The configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    EmptyValue { field: String },
    InvalidUrl { field: String, value: String },
    OutOfRange { field: String },
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Game server connection
    pub server: FileServerConfig,
    /// Game rules
    pub game: FileGameConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Transcript logging
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.server.validate());
        issues.extend(self.game.validate());
        issues.extend(self.logging.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://mystery.example.com"
connect_timeout_seconds = 5
suggestion_timeout_seconds = 10

[game]
max_rounds = 20
session_id = "abc123"

[output]
color = false

[logging]
transcript = "logs/game.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://mystery.example.com");
        assert_eq!(config.server.connect_timeout_seconds, Some(5));
        assert_eq!(config.server.suggestion_timeout_seconds, 10);
        assert_eq!(config.game.max_rounds, 20);
        assert_eq!(config.game.session_id.as_deref(), Some("abc123"));
        assert!(!config.output.color);
        assert_eq!(
            config.logging.transcript.as_deref(),
            Some(std::path::Path::new("logs/game.jsonl"))
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[game]\nmax_rounds = 5\n").unwrap();
        assert_eq!(config.game.max_rounds, 5);
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = FileConfig::default();
        config.server.base_url = "localhost".to_string();
        config.game.max_rounds = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(ConfigIssue::is_error));
    }
}
