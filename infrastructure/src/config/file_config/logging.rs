//! Logging configuration from TOML (`[logging]` section)

use super::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript file. No transcript is written when unset.
    pub transcript: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        match &self.transcript {
            Some(path) if path.as_os_str().is_empty() => vec![ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "logging.transcript".to_string(),
                },
                message: "logging.transcript is empty; no transcript will be written"
                    .to_string(),
            }],
            _ => Vec::new(),
        }
    }
}
