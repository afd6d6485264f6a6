//! Configuration management for cobrowse
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/cobrowse/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{CobrowseError, Result};

/// Main configuration for cobrowse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reasoning backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Action dispatcher configuration
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

/// Remote reasoning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend (the chat endpoint is `{url}/chat`)
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of recent message turns sent along with each request
    /// Default: 10
    pub history_window: usize,
    /// Maximum stored history length
    /// Default: 100
    pub max_history: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Dispatcher behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Report failure when `input` targets a node that cannot hold text.
    /// When false, the legacy behavior applies: nothing is written but the
    /// command still reports success.
    pub strict_input: bool,
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: env::var("COBROWSE_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout_secs: env::var("COBROWSE_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            max_history: 100,
            debug: env_flag("COBROWSE_DEBUG").unwrap_or(false),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            strict_input: env_flag("COBROWSE_STRICT_INPUT").unwrap_or(true),
        }
    }
}

impl BackendConfig {
    /// Full URL of the chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.url.trim_end_matches('/'))
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        format!("{}/health", self.url.trim_end_matches('/'))
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cobrowse")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(CobrowseError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| CobrowseError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections take defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CobrowseError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                CobrowseError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CobrowseError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| CobrowseError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
