//! Prompts: suspension points that wait for a specific kind of reply

use serde::{Deserialize, Serialize};
use crate::models::{ChoiceCard, Reply};
use crate::utils::helpers::normalize_whitespace;

/// A pending question to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prompt {
    /// Single choice from a card of labels
    Choice { card: ChoiceCard },
    /// Free text
    Text { text: String },
}

impl Prompt {
    pub fn choice<S: AsRef<str>>(labels: &[S]) -> Self {
        Prompt::Choice {
            card: ChoiceCard::from_labels(labels),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Prompt::Text { text: text.into() }
    }

    /// Messages sent when the prompt is first shown and on every retry
    pub fn render(&self) -> Vec<Reply> {
        match self {
            Prompt::Choice { card } => vec![Reply::card(card.clone())],
            Prompt::Text { text } => vec![Reply::text(text.clone())],
        }
    }

    /// Resolve a raw reply into the prompt's value.
    ///
    /// Choices match a label case-insensitively or by 1-based position and
    /// always yield the canonical label. `None` means the reply is not valid
    /// for this prompt.
    pub fn recognize(&self, input: &str) -> Option<String> {
        match self {
            Prompt::Text { .. } => {
                let input = input.trim();
                (!input.is_empty()).then(|| input.to_string())
            }
            Prompt::Choice { card } => {
                let input = normalize_whitespace(input);
                if input.is_empty() {
                    return None;
                }
                let labels = card.labels();
                if let Some(label) = labels.iter().find(|l| l.eq_ignore_ascii_case(&input)) {
                    return Some(label.to_string());
                }
                input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| labels.get(i))
                    .map(|l| l.to_string())
            }
        }
    }
}
