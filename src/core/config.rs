use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_recent_transactions() -> usize {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Identifier the backend uses for the signed-in user.
    pub user_id: String,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How many transactions the list views show.
    #[serde(default = "default_recent_transactions")]
    pub recent_transactions: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "finlink", "finlink")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            anyhow::bail!("user_id must not be empty");
        }
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "backend.base_url must start with http:// or https://, got '{}'",
                self.backend.base_url
            );
        }
        if self.backend.timeout_secs == 0 {
            anyhow::bail!("backend.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
user_id: "user-42"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.user_id, "user-42");
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.recent_transactions, 5);

        let yaml_str_with_backend = r#"
user_id: "user-42"
backend:
  base_url: "http://example.com/api"
currency: "EUR"
recent_transactions: 10
        "#;
        let config_with_backend: AppConfig = serde_yaml::from_str(yaml_str_with_backend).unwrap();
        assert_eq!(
            config_with_backend.backend.base_url,
            "http://example.com/api"
        );
        assert_eq!(config_with_backend.backend.timeout_secs, 30);
        assert_eq!(config_with_backend.currency, "EUR");
        assert_eq!(config_with_backend.recent_transactions, 10);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "user_id: \"u1\"\nbackend:\n  base_url: \"localhost:8000\"\n",
        )
        .unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("base_url"));

        fs::write(file.path(), "user_id: \"  \"\n").unwrap();
        assert!(AppConfig::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load_from_path("/nonexistent/finlink/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
