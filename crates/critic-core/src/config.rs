//! Configuration for the backend connection and generation settings.

use core::fmt;
use core::time::Duration;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use toml::{from_str, to_string_pretty};
use tracing::debug;

use crate::schema::SchemaVariant;
use crate::{Error, Result};

/// Env var consulted when no `OpenRouter` key is configured.
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
/// Env var consulted when no Groq key is configured.
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";

/// Complete service configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    /// Which backend to call and how
    pub backend: BackendConfig,
    /// API keys for hosted backends
    pub api_keys: ApiKeys,
    /// Generation settings
    pub generation: GenerationConfig,
}

/// Supported model backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `OpenRouter` chat completions
    #[default]
    OpenRouter,
    /// Groq chat completions
    Groq,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Config/CLI identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend to use
    pub provider: ProviderKind,
    /// Model override; each backend has its own default
    pub model: Option<String>,
    /// Base URL override (Ollama, or a compatible proxy)
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            base_url: None,
            temperature: 0.4,
            max_tokens: 1024,
        }
    }
}

/// API keys for hosted backends.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// `OpenRouter` API key
    pub openrouter_api_key: Option<String>,
    /// Groq API key
    pub groq_api_key: Option<String>,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let presence = |key: Option<&String>| if key.is_some() { "present" } else { "missing" };
        formatter
            .debug_struct("ApiKeys")
            .field("openrouter_api_key", &presence(self.openrouter_api_key.as_ref()))
            .field("groq_api_key", &presence(self.groq_api_key.as_ref()))
            .finish()
    }
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Ceiling on a single backend call, in seconds
    pub timeout_seconds: u64,
    /// Request a beginner-oriented explanation of the code as well
    pub explain_code: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            explain_code: false,
        }
    }
}

impl GenerationConfig {
    /// Timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Result shape implied by `explain_code`.
    pub const fn variant(&self) -> SchemaVariant {
        if self.explain_code {
            SchemaVariant::Extended
        } else {
            SchemaVariant::Standard
        }
    }
}

impl CriticConfig {
    /// Get the default config directory path (`~/.critic`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home =
            home_dir().ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".critic"))
    }

    /// Get the default config file path (`~/.critic/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with defaults if absent
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path()?)
    }

    /// Load config from `path`, creating it with defaults if absent
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it sets
    /// a zero generation timeout
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = from_str(&contents)?;

        if config.generation.timeout_seconds == 0 {
            return Err(Error::Config(format!(
                "{}: generation.timeout_seconds must be at least 1",
                path.display()
            )));
        }

        debug!(
            "Loaded config from {:?}: provider={}, api_keys={:?}",
            path, config.backend.provider, config.api_keys
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Critic Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;

        Ok(())
    }

    /// Get API key for a provider, checking config first, then environment variables
    pub fn get_api_key(&self, provider: ProviderKind) -> Option<String> {
        let (configured, env_key) = match provider {
            ProviderKind::OpenRouter => (&self.api_keys.openrouter_api_key, ENV_OPENROUTER_API_KEY),
            ProviderKind::Groq => (&self.api_keys.groq_api_key, ENV_GROQ_API_KEY),
            ProviderKind::Ollama => return None,
        };
        configured
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env::var(env_key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = CriticConfig::default();
        assert_eq!(config.backend.provider, ProviderKind::OpenRouter);
        assert_eq!(config.generation.timeout(), Duration::from_secs(60));
        assert_eq!(config.generation.variant(), SchemaVariant::Standard);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(
                br#"
[backend]
provider = "ollama"
model = "qwen2.5-coder:7b"

[generation]
explain_code = true
"#,
            )
            .expect("Failed to write to temp file");

        let config = CriticConfig::load_from_file(temp_file.path()).expect("Failed to load config");
        assert_eq!(config.backend.provider, ProviderKind::Ollama);
        assert_eq!(config.backend.model.as_deref(), Some("qwen2.5-coder:7b"));
        assert_eq!(config.backend.max_tokens, 1024);
        assert_eq!(config.generation.timeout_seconds, 60);
        assert_eq!(config.generation.variant(), SchemaVariant::Extended);
    }

    #[test]
    fn test_configured_key_wins() {
        let config = CriticConfig {
            api_keys: ApiKeys {
                groq_api_key: Some("gsk_configured".to_owned()),
                openrouter_api_key: None,
            },
            ..CriticConfig::default()
        };
        assert_eq!(
            config.get_api_key(ProviderKind::Groq).as_deref(),
            Some("gsk_configured")
        );
        assert!(config.get_api_key(ProviderKind::Ollama).is_none());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("nested").join("config.toml");

        let created = CriticConfig::load_or_create_at(&path).expect("Failed to create config");
        assert!(path.exists());
        let written = fs::read_to_string(&path).expect("Failed to read config");
        assert!(written.starts_with("# Critic Configuration File"));

        let reloaded = CriticConfig::load_or_create_at(&path).expect("Failed to reload config");
        assert_eq!(reloaded.backend.provider, created.backend.provider);
        assert_eq!(reloaded.generation.timeout_seconds, created.generation.timeout_seconds);
    }

    #[test]
    fn test_invalid_toml_is_toml_error() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(b"[backend\nprovider = ")
            .expect("Failed to write to temp file");
        let error = CriticConfig::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(error, Error::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let error = CriticConfig::load_from_file(&temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(b"[generation]\ntimeout_seconds = 0\n")
            .expect("Failed to write to temp file");
        let error = CriticConfig::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(error, Error::Config(ref message) if message.contains("timeout_seconds")));
    }

    #[test]
    fn test_debug_hides_api_keys() {
        let keys = ApiKeys {
            openrouter_api_key: Some("sk-or-v1-secret".to_owned()),
            groq_api_key: None,
        };
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("present"));
        assert!(rendered.contains("missing"));
    }
}
