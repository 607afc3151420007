//! Choice card model
//!
//! A card is a list of submit actions. Each action's data is its own title, so
//! selecting it submits exactly the label that was displayed.

use serde::{Deserialize, Serialize};
use crate::utils::helpers::format_numbered_list;

/// A single selectable action on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub data: String,
}

impl CardAction {
    /// Create a submit action whose data equals its title
    pub fn submit(label: &str) -> Self {
        Self {
            kind: "Action.Submit".to_string(),
            title: label.to_string(),
            data: label.to_string(),
        }
    }
}

/// Selectable menu of labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCard {
    pub actions: Vec<CardAction>,
}

impl ChoiceCard {
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            actions: labels.iter().map(|l| CardAction::submit(l.as_ref())).collect(),
        }
    }

    /// Labels in display order
    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.title.as_str()).collect()
    }

    /// Equivalent plain-text rendering for channels without buttons
    pub fn to_plain_text(&self) -> String {
        format_numbered_list(&self.labels())
    }
}
