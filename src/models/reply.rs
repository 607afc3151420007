//! Outbound bot replies, independent of the delivering channel

use serde::{Deserialize, Serialize};
use super::card::ChoiceCard;

/// One outbound message produced during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Text { text: String },
    Card { card: ChoiceCard },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text { text: text.into() }
    }

    pub fn card(card: ChoiceCard) -> Self {
        Reply::Card { card }
    }

    /// Text body if this is a plain message
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text { text } => Some(text),
            Reply::Card { .. } => None,
        }
    }

    pub fn as_card(&self) -> Option<&ChoiceCard> {
        match self {
            Reply::Card { card } => Some(card),
            Reply::Text { .. } => None,
        }
    }
}
