//! Server configuration from TOML (`[server]` section)

use super::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SUGGESTION_TIMEOUT_SECONDS: u64 = 30;

/// Raw server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the game server, without the `/api` suffix
    pub base_url: String,
    /// Connect timeout. Streams themselves are never timed out.
    pub connect_timeout_seconds: Option<u64>,
    /// How long to wait for suggested questions. The server never answers
    /// for a character it does not know.
    pub suggestion_timeout_seconds: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_seconds: None,
            suggestion_timeout_seconds: DEFAULT_SUGGESTION_TIMEOUT_SECONDS,
        }
    }
}

impl FileServerConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_seconds.map(Duration::from_secs)
    }

    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_secs(self.suggestion_timeout_seconds)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.validate_base_url();
        if self.suggestion_timeout_seconds == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::OutOfRange {
                    field: "server.suggestion_timeout_seconds".to_string(),
                },
                message: "server.suggestion_timeout_seconds must be at least 1".to_string(),
            });
        }
        issues
    }

    fn validate_base_url(&self) -> Vec<ConfigIssue> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return vec![ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyValue {
                    field: "server.base_url".to_string(),
                },
                message: "server.base_url must not be empty".to_string(),
            }];
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return vec![ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::InvalidUrl {
                    field: "server.base_url".to_string(),
                    value: self.base_url.clone(),
                },
                message: format!(
                    "server.base_url: '{}' is not an http(s) URL",
                    self.base_url
                ),
            }];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout() {
        let config = FileServerConfig {
            connect_timeout_seconds: Some(3),
            ..Default::default()
        };
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(FileServerConfig::default().connect_timeout(), None);
    }

    #[test]
    fn test_zero_suggestion_timeout_is_error() {
        let config = FileServerConfig {
            suggestion_timeout_seconds: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(
            FileServerConfig::default().suggestion_timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_empty_url_is_error() {
        let config = FileServerConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::EmptyValue {
                field: "server.base_url".to_string()
            }
        );
    }
}
