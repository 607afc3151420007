//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Longest conversation state lifetime accepted from configuration (30 days)
pub const MAX_STATE_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub qna: QnaConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
}

/// QnA Maker knowledge base configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QnaConfig {
    pub knowledge_base_id: String,
    pub endpoint_key: String,
    /// Endpoint host including the `/qnamaker` path segment
    pub host: String,
    #[serde(default = "default_qna_timeout")]
    pub timeout_seconds: u64,
    /// Minimum answer confidence in `0.0..=1.0`
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

/// Redis configuration for conversation state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Conversation state configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    pub ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    #[serde(default)]
    pub json: bool,
}

fn default_qna_timeout() -> u64 {
    10
}

fn default_score_threshold() -> f32 {
    0.3
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 86_400,
        }
    }
}

impl Settings {
    /// Load settings from the optional `config` file and environment variables
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(config::Config::builder().add_source(File::with_name("config").required(false)))
    }

    /// Load settings from an explicit file, still honouring environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load(config::Config::builder().add_source(File::from(path)))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(Environment::with_prefix("REGIONBUDDY").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::RegionBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
            },
            qna: QnaConfig {
                knowledge_base_id: String::new(),
                endpoint_key: String::new(),
                host: String::new(),
                timeout_seconds: default_qna_timeout(),
                score_threshold: default_score_threshold(),
            },
            redis: None,
            state: StateConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                json: false,
            },
        }
    }
}
