//! Root menu: pick a state, branch into the region flow for Maharashtra

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FlowKind, FlowState, Prompt, StepOutcome, TurnContext, FOLLOW_UP_MESSAGE};
use crate::state::FlowFrame;
use crate::utils::errors::{RegionBuddyError, Result};

pub const GREETING: &str = "Please select one State?";
pub const REGIONS: [&str; 4] = ["Maharashtra", "Karnataka", "Tamil Nadu", "Andhra Pradesh"];
/// The only region with a nested city menu
pub const BRANCHING_REGION: &str = "Maharashtra";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainMenuStep {
    AskRegion,
    Dispatch,
    Restart,
}

pub fn run_step(
    turn: &mut TurnContext<'_>,
    frame: &mut FlowFrame,
    step: MainMenuStep,
    result: Option<String>,
) -> Result<StepOutcome> {
    match step {
        MainMenuStep::AskRegion => {
            let greeting = frame.options.clone().unwrap_or_else(|| GREETING.to_string());
            turn.send_text(greeting);
            Ok(StepOutcome::Prompt {
                prompt: Prompt::choice(&REGIONS),
                resume: FlowState::MainMenu(MainMenuStep::Dispatch),
            })
        }
        MainMenuStep::Dispatch => {
            let region = result.ok_or_else(|| RegionBuddyError::InvalidStateTransition {
                from: "main_menu.ask_region".to_string(),
                to: "main_menu.dispatch".to_string(),
            })?;
            frame.set_value("region", &region)?;
            debug!(chat_id = turn.chat_id, region = %region, "Region selected");

            if region == BRANCHING_REGION {
                Ok(StepOutcome::Call {
                    flow: FlowKind::Region,
                    resume: FlowState::MainMenu(MainMenuStep::Restart),
                })
            } else {
                Ok(StepOutcome::Continue {
                    next: FlowState::MainMenu(MainMenuStep::Restart),
                    result: None,
                })
            }
        }
        MainMenuStep::Restart => {
            if let Some(city) = result {
                debug!(chat_id = turn.chat_id, city = %city, "Region flow finished");
            }
            Ok(StepOutcome::Replace {
                flow: FlowKind::MainMenu,
                options: Some(FOLLOW_UP_MESSAGE.to_string()),
            })
        }
    }
}
