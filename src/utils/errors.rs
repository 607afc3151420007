//! Error handling for RegionBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for RegionBuddy application
#[derive(Error, Debug)]
pub enum RegionBuddyError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("QnA Maker error: {0}")]
    Qna(#[from] QnaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// QnA Maker specific errors
#[derive(Error, Debug)]
pub enum QnaError {
    #[error("QnA Maker request failed: {0}")]
    RequestFailed(String),

    #[error("QnA Maker timeout")]
    Timeout,

    #[error("QnA Maker rejected the endpoint key")]
    Unauthorized,

    #[error("Invalid QnA Maker response: {0}")]
    InvalidResponse(String),

    #[error("QnA Maker service unavailable")]
    ServiceUnavailable,
}

/// Result type alias for RegionBuddy operations
pub type Result<T> = std::result::Result<T, RegionBuddyError>;

impl RegionBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            RegionBuddyError::Telegram(_) => true,
            RegionBuddyError::Qna(QnaError::Unauthorized) => false,
            RegionBuddyError::Qna(_) => true,
            RegionBuddyError::Config(_) => false,
            RegionBuddyError::InvalidStateTransition { .. } => false,
            RegionBuddyError::Redis(_) => true,
            RegionBuddyError::Http(_) => true,
            RegionBuddyError::Serialization(_) => false,
            RegionBuddyError::Io(_) => true,
            RegionBuddyError::UrlParse(_) => false,
            RegionBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RegionBuddyError::Config(_) => ErrorSeverity::Critical,
            RegionBuddyError::Qna(QnaError::Unauthorized) => ErrorSeverity::Critical,
            RegionBuddyError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            RegionBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
