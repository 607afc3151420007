//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{RegionBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_qna_config(&settings.qna)?;
    validate_state_config(&settings.state)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref redis_config) = settings.redis {
        validate_redis_config(redis_config)?;
    }

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(RegionBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate QnA Maker configuration
pub(crate) fn validate_qna_config(config: &super::QnaConfig) -> Result<()> {
    if config.knowledge_base_id.is_empty() {
        return Err(RegionBuddyError::Config(
            "QnA knowledge base ID is required".to_string()
        ));
    }

    if config.endpoint_key.is_empty() {
        return Err(RegionBuddyError::Config(
            "QnA endpoint key is required".to_string()
        ));
    }

    if config.host.is_empty() {
        return Err(RegionBuddyError::Config(
            "QnA endpoint host is required".to_string()
        ));
    }

    let host = url::Url::parse(&config.host)?;
    if host.scheme() != "http" && host.scheme() != "https" {
        return Err(RegionBuddyError::Config(
            format!("QnA endpoint host must be http(s): {}", config.host)
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(RegionBuddyError::Config(
            "QnA timeout must be greater than 0".to_string()
        ));
    }

    if !(0.0..=1.0).contains(&config.score_threshold) {
        return Err(RegionBuddyError::Config(
            format!("QnA score threshold must be within 0.0..=1.0, got {}", config.score_threshold)
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(RegionBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate conversation state configuration
fn validate_state_config(config: &super::StateConfig) -> Result<()> {
    if config.ttl_seconds < 60 {
        return Err(RegionBuddyError::Config(
            "State TTL must be at least 60 seconds".to_string()
        ));
    }

    if config.ttl_seconds > super::MAX_STATE_TTL_SECONDS {
        return Err(RegionBuddyError::Config(
            format!("State TTL must be at most {} seconds", super::MAX_STATE_TTL_SECONDS)
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(RegionBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(RegionBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::config::{RedisConfig, MAX_STATE_TTL_SECONDS};

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "12345:test_token".to_string();
        settings.qna.knowledge_base_id = "kb-1".to_string();
        settings.qna.endpoint_key = "secret".to_string();
        settings.qna.host = "https://example.azurewebsites.net/qnamaker".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_defaults_require_credentials() {
        assert_matches!(validate_settings(&Settings::default()), Err(RegionBuddyError::Config(_)));
    }

    #[test]
    fn test_missing_qna_fields_rejected() {
        let mut settings = valid_settings();
        settings.qna.endpoint_key.clear();
        assert_matches!(validate_settings(&settings), Err(RegionBuddyError::Config(msg)) if msg.contains("endpoint key"));

        let mut settings = valid_settings();
        settings.qna.host = "not a url".to_string();
        assert_matches!(validate_settings(&settings), Err(RegionBuddyError::UrlParse(_)));

        let mut settings = valid_settings();
        settings.qna.host = "ftp://example.com".to_string();
        assert_matches!(validate_settings(&settings), Err(RegionBuddyError::Config(_)));
    }

    #[test]
    fn test_score_threshold_bounds() {
        let mut settings = valid_settings();
        settings.qna.score_threshold = 1.5;
        assert!(validate_settings(&settings).is_err());

        settings.qna.score_threshold = 0.0;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_redis_and_logging_rules() {
        let mut settings = valid_settings();
        settings.redis = Some(RedisConfig {
            url: String::new(),
            prefix: "regionbuddy:".to_string(),
        });
        assert!(validate_settings(&settings).is_err());

        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());

        let mut settings = valid_settings();
        settings.state.ttl_seconds = 5;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_state_ttl_upper_bound() {
        let mut settings = valid_settings();
        settings.state.ttl_seconds = MAX_STATE_TTL_SECONDS;
        assert!(validate_settings(&settings).is_ok());

        settings.state.ttl_seconds = MAX_STATE_TTL_SECONDS + 1;
        assert_matches!(validate_settings(&settings), Err(RegionBuddyError::Config(msg)) if msg.contains("at most"));

        settings.state.ttl_seconds = 10_000_000_000_000;
        assert!(validate_settings(&settings).is_err());
    }
}
