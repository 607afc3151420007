//! RegionBuddy Telegram Bot
//!
//! A menu-driven Telegram bot: the user picks an Indian state and, for
//! Maharashtra, a city. Choosing "Other" forwards a free-text question to a
//! QnA Maker knowledge base.

#![allow(non_snake_case)]

pub mod config;
pub mod dialogs;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{QnaError, RegionBuddyError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use state::{DialogStack, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
