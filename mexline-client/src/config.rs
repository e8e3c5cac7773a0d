//! Newsletter socket configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via MEXLINE_CONFIG or --config)
//! 3. Environment variables

use crate::events::DEFAULT_EVENT_CHANNEL_CAPACITY;
use mexline_protocol::NewsletterJid;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Newsletter socket configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Auto-follow configuration.
    pub auto_follow: AutoFollowConfig,
    /// Connection event configuration.
    pub events: EventsConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MEXLINE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.auto_follow.apply_env_overrides()?;
        self.events.apply_env_overrides();
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "events.channel_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Auto-follow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFollowConfig {
    /// Run a follow pass each time the connection opens.
    pub enabled: bool,
    /// Newsletters to keep followed.
    pub newsletters: Vec<NewsletterJid>,
}

impl Default for AutoFollowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            newsletters: Vec::new(),
        }
    }
}

impl AutoFollowConfig {
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(enabled) = std::env::var("MEXLINE_AUTO_FOLLOW") {
            self.enabled = enabled == "1" || enabled.to_lowercase() == "true";
        }

        if let Ok(list) = std::env::var("MEXLINE_AUTO_FOLLOW_NEWSLETTERS") {
            self.newsletters = parse_newsletter_list(&list)?;
        }

        Ok(())
    }

    /// Returns whether a listener should be started.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.newsletters.is_empty()
    }
}

/// Parses a comma-separated list of newsletter jids.
fn parse_newsletter_list(list: &str) -> Result<Vec<NewsletterJid>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NewsletterJid::parse(s).map_err(|e| {
                ConfigError::ValidationError(format!("MEXLINE_AUTO_FOLLOW_NEWSLETTERS: {}", e))
            })
        })
        .collect()
}

/// Connection event configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the connection update channel.
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl EventsConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(capacity) = std::env::var("MEXLINE_EVENT_CHANNEL_CAPACITY") {
            if let Ok(n) = capacity.parse() {
                self.channel_capacity = n;
            }
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
