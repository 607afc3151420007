//! Region flow for Maharashtra: pick a city or ask the knowledge base

use serde::{Deserialize, Serialize};

use super::{FlowState, Prompt, StepOutcome, TurnContext};
use crate::services::qna::QueryOptions;
use crate::state::FlowFrame;
use crate::utils::errors::{RegionBuddyError, Result};
use crate::utils::logging::log_qna_query;

pub const CITY_PROMPT: &str = "Please select one City?";
pub const CITIES: [&str; 5] = ["Mumbai", "Pune", "Nagpur", "Aurangabad", OTHER];
/// Escape choice that leads to a free-text question
pub const OTHER: &str = "Other";
pub const QUESTION_PROMPT: &str = "Please provide your question here.";
pub const CITY_DETAILS: &str = "City Details....";
pub const NO_ANSWER: &str = "No QnA Maker answers were found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStep {
    AskCity,
    ResolveCity,
    Lookup,
    Finish,
}

fn missing_result(from: &str, to: &str) -> RegionBuddyError {
    RegionBuddyError::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

pub async fn run_step(
    turn: &mut TurnContext<'_>,
    frame: &mut FlowFrame,
    step: RegionStep,
    result: Option<String>,
) -> Result<StepOutcome> {
    match step {
        RegionStep::AskCity => {
            turn.send_text(CITY_PROMPT);
            Ok(StepOutcome::Prompt {
                prompt: Prompt::choice(&CITIES),
                resume: FlowState::Region(RegionStep::ResolveCity),
            })
        }
        RegionStep::ResolveCity => {
            let city = result.ok_or_else(|| missing_result("region.ask_city", "region.resolve_city"))?;
            frame.set_value("city", &city)?;

            if city == OTHER {
                return Ok(StepOutcome::Prompt {
                    prompt: Prompt::text(QUESTION_PROMPT),
                    resume: FlowState::Region(RegionStep::Lookup),
                });
            }

            turn.send_text(format!("You have selected {}", city));
            turn.send_text(CITY_DETAILS);
            Ok(StepOutcome::Continue {
                next: FlowState::Region(RegionStep::Finish),
                result: None,
            })
        }
        RegionStep::Lookup => {
            let question = result.ok_or_else(|| missing_result("region.resolve_city", "region.lookup"))?;
            frame.set_value("question", &question)?;

            let answers = turn.qna.get_answers(&question, &QueryOptions { top: 1, score_threshold: None }).await?;
            log_qna_query(turn.chat_id, &question, !answers.is_empty());

            match answers.first() {
                Some(top) => turn.send_text(top.answer.clone()),
                None => turn.send_text(NO_ANSWER),
            }
            Ok(StepOutcome::Continue {
                next: FlowState::Region(RegionStep::Finish),
                result: None,
            })
        }
        RegionStep::Finish => Ok(StepOutcome::End {
            result: frame.get_string("city"),
        }),
    }
}
