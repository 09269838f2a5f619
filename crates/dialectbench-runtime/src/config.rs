//! Runtime configuration.
//!
//! Sources are applied in order, later ones winning: built-in defaults, an
//! optional YAML file, the `GEMINI_API_KEY` environment variable, then
//! command-line overrides. For the API key the order is flag, file,
//! environment.
//!
//! ```yaml
//! api_key: "AIza..."
//! model: gemini-3.0-pro-preview
//! translation_model: gemini-2.5-pro
//! endpoint: https://generativelanguage.googleapis.com/v1beta
//! request_delay: 1200ms
//! timeout: 60s
//! max_workers: 4
//! data_dir: ./data
//! ```

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::providers::{ApiCredential, CompletionConfig, CredentialSource};

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-3.0-pro-preview";
pub const DEFAULT_TRANSLATION_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_WORKERS: usize = 4;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const CREDENTIAL_NAME: &str = "Gemini API key";

/// Errors while building a [`RuntimeConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid duration for '{key}': '{value}' ({source})")]
    InvalidDuration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings as written in the YAML file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub translation_model: Option<String>,
    pub endpoint: Option<String>,
    /// humantime duration, e.g. `1200ms` or `2s`
    pub request_delay: Option<String>,
    pub timeout: Option<String>,
    pub max_workers: Option<usize>,
    pub data_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub request_delay: Option<Duration>,
    pub max_workers: Option<usize>,
    pub data_dir: Option<PathBuf>,
}

/// Resolved settings, built once at startup and shared read-only.
#[derive(Debug)]
pub struct RuntimeConfig {
    /// Provider registry key
    pub provider: String,
    /// Model for evaluation runs
    pub model: String,
    /// Model for translation runs
    pub translation_model: String,
    /// API root; `None` uses the provider default
    pub endpoint: Option<String>,
    /// Pause after every row
    pub request_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on concurrently processed files
    pub max_workers: usize,
    /// Directory holding the dataset CSV files
    pub data_dir: PathBuf,
    api_key: Option<ApiCredential>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            endpoint: None,
            request_delay: DEFAULT_REQUEST_DELAY,
            timeout: DEFAULT_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
            data_dir: PathBuf::from("."),
            api_key: None,
        }
    }
}

fn parse_duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|source| ConfigError::InvalidDuration {
        key,
        value: value.to_string(),
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RuntimeConfig {
    /// Load the optional YAML file and apply environment and overrides.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = path.map(ConfigFile::from_yaml_file).transpose()?;
        Self::resolve(file, overrides, |name| std::env::var(name).ok())
    }

    /// Merge all sources. `env` looks up environment variables.
    pub fn resolve<F>(
        file: Option<ConfigFile>,
        overrides: ConfigOverrides,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let file = file.unwrap_or_default();

        if let Some(provider) = file.provider {
            config.provider = provider;
        }
        if let Some(model) = file.model {
            config.model = model;
        }
        if let Some(model) = file.translation_model {
            config.translation_model = model;
        }
        config.endpoint = file.endpoint;
        if let Some(delay) = file.request_delay.as_deref() {
            config.request_delay = parse_duration("request_delay", delay)?;
        }
        if let Some(timeout) = file.timeout.as_deref() {
            config.timeout = parse_duration("timeout", timeout)?;
        }
        if let Some(workers) = file.max_workers {
            config.max_workers = workers;
        }
        if let Some(dir) = file.data_dir {
            config.data_dir = dir;
        }

        config.api_key = match (
            non_empty(overrides.api_key),
            non_empty(file.api_key),
            non_empty(env(API_KEY_ENV)),
        ) {
            (Some(key), _, _) => Some(ApiCredential::new(
                key,
                CredentialSource::CommandLine,
                CREDENTIAL_NAME,
            )),
            (None, Some(key), _) => Some(ApiCredential::new(
                key,
                CredentialSource::Config,
                CREDENTIAL_NAME,
            )),
            (None, None, Some(key)) => Some(ApiCredential::new(
                key,
                CredentialSource::Environment,
                CREDENTIAL_NAME,
            )),
            (None, None, None) => None,
        };

        if let Some(model) = overrides.model {
            config.model = model;
        }
        if let Some(endpoint) = overrides.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(delay) = overrides.request_delay {
            config.request_delay = delay;
        }
        if let Some(workers) = overrides.max_workers {
            config.max_workers = workers;
        }
        if let Some(dir) = overrides.data_dir {
            config.data_dir = dir;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid("max_workers must be at least 1".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        Ok(())
    }

    pub fn credential(&self) -> Option<&ApiCredential> {
        self.api_key.as_ref()
    }

    /// JSON settings handed to the provider registry.
    pub fn provider_settings(&self) -> JsonValue {
        let mut settings = serde_json::json!({});
        if let Some(credential) = &self.api_key {
            settings["api_key"] = JsonValue::String(credential.expose().to_string());
            settings["credential_source"] = JsonValue::String(credential.source().to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            settings["endpoint"] = JsonValue::String(endpoint.clone());
        }
        settings
    }

    /// Per-call settings, using `model` when given and the evaluation model otherwise.
    pub fn completion_config(&self, model: Option<&str>) -> CompletionConfig {
        CompletionConfig::new(model.unwrap_or(&self.model), self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::resolve(None, ConfigOverrides::default(), no_env).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.translation_model, "gemini-2.5-pro");
        assert_eq!(config.request_delay, Duration::from_millis(1200));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_workers, 4);
        assert!(config.credential().is_none());
        assert_eq!(config.provider_settings(), serde_json::json!({}));
    }

    #[test]
    fn test_yaml_file_values() {
        let file = ConfigFile::from_yaml(
            "model: gemini-2.5-flash\nrequest_delay: 250ms\ntimeout: 2m\nmax_workers: 2\nendpoint: http://localhost:9000\n",
        )
        .unwrap();
        let config = RuntimeConfig::resolve(Some(file), ConfigOverrides::default(), no_env).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.request_delay, Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.provider_settings()["endpoint"], "http://localhost:9000");
    }

    #[test]
    fn test_overrides_win() {
        let file = ConfigFile::from_yaml("model: from-file\nmax_workers: 2\n").unwrap();
        let overrides = ConfigOverrides {
            model: Some("from-flag".to_string()),
            request_delay: Some(Duration::ZERO),
            max_workers: Some(3),
            ..Default::default()
        };
        let config = RuntimeConfig::resolve(Some(file), overrides, no_env).unwrap();
        assert_eq!(config.model, "from-flag");
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(config.max_workers, 3);
    }

    #[test]
    fn test_api_key_precedence() {
        let env = |name: &str| (name == "GEMINI_API_KEY").then(|| "env-key".to_string());

        let config = RuntimeConfig::resolve(None, ConfigOverrides::default(), env).unwrap();
        let cred = config.credential().unwrap();
        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.source(), CredentialSource::Environment);

        let file = ConfigFile::from_yaml("api_key: file-key").unwrap();
        let config = RuntimeConfig::resolve(Some(file.clone()), ConfigOverrides::default(), env)
            .unwrap();
        assert_eq!(config.credential().unwrap().expose(), "file-key");

        let overrides = ConfigOverrides {
            api_key: Some("flag-key".to_string()),
            ..Default::default()
        };
        let config = RuntimeConfig::resolve(Some(file), overrides, env).unwrap();
        assert_eq!(config.credential().unwrap().expose(), "flag-key");
        assert_eq!(config.provider_settings()["credential_source"], "command line");
    }

    #[test]
    fn test_blank_key_falls_through() {
        let file = ConfigFile::from_yaml("api_key: ''").unwrap();
        let env = |_: &str| Some("env-key".to_string());
        let config = RuntimeConfig::resolve(Some(file), ConfigOverrides::default(), env).unwrap();
        assert_eq!(config.credential().unwrap().source(), CredentialSource::Environment);
    }

    #[test]
    fn test_invalid_values() {
        let file = ConfigFile::from_yaml("request_delay: soon").unwrap();
        assert!(matches!(
            RuntimeConfig::resolve(Some(file), ConfigOverrides::default(), no_env),
            Err(ConfigError::InvalidDuration { key: "request_delay", .. })
        ));

        let overrides = ConfigOverrides {
            max_workers: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            RuntimeConfig::resolve(None, overrides, no_env),
            Err(ConfigError::Invalid(_))
        ));

        assert!(ConfigFile::from_yaml("workers: 3").is_err());
    }

    #[test]
    fn test_completion_config() {
        let config = RuntimeConfig::resolve(None, ConfigOverrides::default(), no_env).unwrap();
        assert_eq!(config.completion_config(None).model, DEFAULT_MODEL);
        assert_eq!(
            config.completion_config(Some("gemini-2.5-pro")).model,
            "gemini-2.5-pro"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::load(
            Some(Path::new("/nonexistent/dialectbench.yaml")),
            ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
