//! CLI configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use milestone_scheduling::{RepositoryConfig, UrgencyWeights};
use serde::Deserialize;

/// Settings read from `--config`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fetch timeout, retries and strictness
    pub repository: RepositoryConfig,
    /// Urgency score weights
    pub urgency: UrgencyWeights,
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("milestone.json");
        std::fs::write(
            &path,
            r#"{"repository": {"timeout": 3000, "strict": true}, "urgency": {"difficulty": 4.0}}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.repository.timeout, Duration::from_secs(3));
        assert!(config.repository.strict);
        assert_eq!(config.repository.max_retries, 0);
        assert_eq!(config.urgency.difficulty, 4.0);
        assert_eq!(config.urgency.deadline, 10.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::load(Path::new("/nonexistent/milestone.json")).is_err());
    }
}
