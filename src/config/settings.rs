//! Configuration settings for My Vote.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub assistant: AssistantConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("myvote.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("myvote/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.is_empty() {
            return Err(ConfigError::MissingField("llm.base_url".to_string()).into());
        }
        if self.llm.model.is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()).into());
        }

        if self.store.backend == StoreBackendType::Rest
            && self.store.url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingField("store.url".to_string()).into());
        }

        if self.assistant.default_limit == 0 {
            return Err(ConfigError::Invalid("assistant.default_limit must be > 0".to_string()).into());
        }
        if self.assistant.default_limit > self.assistant.max_limit {
            return Err(ConfigError::Invalid(
                "assistant.default_limit must not exceed assistant.max_limit".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// Language-model API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Chat model name
    pub model: String,
    /// API key; resolved from the environment or the row-store when unset
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature, model default when unset
    pub temperature: Option<f32>,
    /// How long a resolved key is reused before it is looked up again
    pub key_ttl_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            timeout_secs: 30,
            temperature: None,
            key_ttl_secs: 3600,
        }
    }
}

/// Row-store backend type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendType {
    #[default]
    Memory,
    Rest,
}

/// Row-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend type: "memory" or "rest"
    pub backend: StoreBackendType,
    /// Project URL for the REST backend
    pub url: Option<String>,
    /// Anonymous API key for the REST backend
    pub api_key: Option<String>,
    /// JSON file seeding the memory backend
    pub data_file: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendType::Memory,
            url: None,
            api_key: None,
            data_file: None,
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Seed file path with `~` expanded.
    pub fn data_file_path(&self) -> Option<PathBuf> {
        self.data_file
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }
}

/// Assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Rows returned for list questions that name no limit
    pub default_limit: usize,
    /// Upper bound on rows returned for any list question
    pub max_limit: usize,
    /// Application name handed to the model
    pub app_name: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: 100,
            app_name: "എന്റെ വോട്ട് (My Vote)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assistant.default_limit, 5);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::from_str(
            r#"
            [llm]
            model = "gpt-4o-mini"

            [store]
            backend = "rest"
            url = "https://example.supabase.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.store.backend, StoreBackendType::Rest);
        assert_eq!(config.assistant.max_limit, 100);
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let result = Config::from_str(
            r#"
            [store]
            backend = "rest"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_limits_are_validated() {
        assert!(Config::from_str("[assistant]\ndefault_limit = 0").is_err());
        assert!(Config::from_str("[assistant]\ndefault_limit = 10\nmax_limit = 5").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[assistant]\ndefault_limit = 7").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.assistant.default_limit, 7);
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("/nonexistent/myvote.toml").is_err());
    }

    #[test]
    fn test_data_file_tilde_expansion() {
        let config = StoreConfig {
            data_file: Some("~/voters.json".to_string()),
            ..Default::default()
        };
        let path = config.data_file_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~') || dirs::home_dir().is_none());
    }
}
