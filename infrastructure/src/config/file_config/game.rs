//! Game configuration from TOML (`[game]` section)

use super::{ConfigIssue, ConfigIssueCode, Severity};
use casefile_domain::DEFAULT_MAX_ROUNDS;
use serde::{Deserialize, Serialize};

/// Raw game configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGameConfig {
    /// Question budget used until the server reports its own
    pub max_rounds: u32,
    /// Session to use when a command does not name one
    pub session_id: Option<String>,
}

impl Default for FileGameConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            session_id: None,
        }
    }
}

impl FileGameConfig {
    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_rounds == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::OutOfRange {
                    field: "game.max_rounds".to_string(),
                },
                message: "game.max_rounds must be at least 1".to_string(),
            });
        }
        if self
            .session_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "game.session_id".to_string(),
                },
                message: "game.session_id is empty and will be ignored".to_string(),
            });
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rounds() {
        assert_eq!(FileGameConfig::default().max_rounds, 30);
    }

    #[test]
    fn test_blank_session_id_is_warning() {
        let config = FileGameConfig {
            session_id: Some(String::new()),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
