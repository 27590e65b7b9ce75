//! Chizu Configuration Management
//!
//! Handles configuration from environment variables and config files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Database connection
    pub database: DatabaseConfig,

    /// Geocoding backend configuration
    pub geocoder: GeocoderConfig,

    /// Pipeline tuning
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Database
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }

        // Geocoder
        if let Ok(provider) = std::env::var("GEOCODER_PROVIDER") {
            config.geocoder.provider = provider.parse()?;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.geocoder.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.geocoder.ollama_url = url;
        }
        if let Ok(model) = std::env::var("GEOCODER_MODEL") {
            config.geocoder.model = model;
        }

        // Pipeline
        if let Ok(interval) = std::env::var("REQUEST_INTERVAL_MS") {
            config.pipeline.request_interval_ms =
                interval.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "REQUEST_INTERVAL_MS".to_string(),
                    value: interval,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        if env_config.database.url != DatabaseConfig::default().url {
            self.database.url = env_config.database.url;
        }

        // Always use env for sensitive values
        if env_config.geocoder.openai_api_key.is_some() {
            self.geocoder.openai_api_key = env_config.geocoder.openai_api_key;
        }

        Ok(self)
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://chizu.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Geocoding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Geocoding backend to use
    pub provider: GeocoderProvider,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for Azure or compatible APIs)
    pub openai_base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use for context-aware geocoding
    pub model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::Gazetteer,
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            temperature: 0.1,
            timeout_secs: 30,
        }
    }
}

/// Supported geocoding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderProvider {
    /// Built-in coordinate tables only, no external calls
    Gazetteer,
    OpenAI,
    Ollama,
}

impl std::str::FromStr for GeocoderProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gazetteer" => Ok(Self::Gazetteer),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "GEOCODER_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum delay between successive external geocoding calls
    pub request_interval_ms: u64,

    /// Emit a progress event every this many places
    pub progress_interval: usize,

    /// Maximum stored length of mention context strings, in characters
    pub context_cap: usize,

    /// Sentences shorter than this (in characters) are skipped
    pub min_sentence_chars: usize,

    /// Apply context-based confidence adjustment to raw matches
    pub context_adjustment: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 100,
            progress_interval: 50,
            context_cap: 200,
            min_sentence_chars: 10,
            context_adjustment: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.request_interval_ms, 100);
        assert_eq!(config.pipeline.progress_interval, 50);
        assert_eq!(config.pipeline.context_cap, 200);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_geocoder_provider_parse() {
        assert_eq!(
            "openai".parse::<GeocoderProvider>().unwrap(),
            GeocoderProvider::OpenAI
        );
        assert_eq!(
            "ollama".parse::<GeocoderProvider>().unwrap(),
            GeocoderProvider::Ollama
        );
        assert_eq!(
            "gazetteer".parse::<GeocoderProvider>().unwrap(),
            GeocoderProvider::Gazetteer
        );
        assert!("invalid".parse::<GeocoderProvider>().is_err());
    }
}
