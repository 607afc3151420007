//! Conversation flows
//!
//! Each flow is an explicit state enum. A step runs against the active frame
//! and returns a [`StepOutcome`] telling the dialog stack what to do next.

pub mod main_menu;
pub mod prompts;
pub mod region;

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::models::Reply;
use crate::services::QnaMakerService;
use crate::state::FlowFrame;
use crate::utils::errors::Result;

pub use main_menu::MainMenuStep;
pub use prompts::Prompt;
pub use region::RegionStep;

/// Greeting sent when a flow restarts after a completed pass
pub const FOLLOW_UP_MESSAGE: &str = "What else can I do for you?";

/// Identifies a flow definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    MainMenu,
    Region,
}

impl FlowKind {
    pub fn initial_state(self) -> FlowState {
        match self {
            FlowKind::MainMenu => FlowState::MainMenu(MainMenuStep::AskRegion),
            FlowKind::Region => FlowState::Region(RegionStep::AskCity),
        }
    }

    /// Whether "help" and "cancel" interrupt this flow
    pub fn is_interruptible(self) -> bool {
        matches!(self, FlowKind::Region)
    }

    pub fn name(self) -> &'static str {
        match self {
            FlowKind::MainMenu => "main_menu",
            FlowKind::Region => "region",
        }
    }
}

/// Step a frame runs next, tagged by flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", content = "step", rename_all = "snake_case")]
pub enum FlowState {
    MainMenu(MainMenuStep),
    Region(RegionStep),
}

impl FlowState {
    pub fn kind(&self) -> FlowKind {
        match self {
            FlowState::MainMenu(_) => FlowKind::MainMenu,
            FlowState::Region(_) => FlowKind::Region,
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::MainMenu(step) => write!(f, "main_menu.{:?}", step),
            FlowState::Region(step) => write!(f, "region.{:?}", step),
        }
    }
}

/// What the dialog stack does after a step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Show the prompt and suspend; the reply resumes the frame at `resume`
    Prompt { prompt: Prompt, resume: FlowState },
    /// Run `next` in the same frame immediately
    Continue { next: FlowState, result: Option<String> },
    /// Push `flow`; when it ends the caller resumes at `resume`
    Call { flow: FlowKind, resume: FlowState },
    /// Replace the active frame with a fresh `flow`
    Replace { flow: FlowKind, options: Option<String> },
    /// Pop the active frame, handing `result` to the caller
    End { result: Option<String> },
}

/// Per-turn services and the replies produced so far
pub struct TurnContext<'a> {
    pub chat_id: i64,
    pub qna: &'a QnaMakerService,
    replies: Vec<Reply>,
}

impl<'a> TurnContext<'a> {
    pub fn new(chat_id: i64, qna: &'a QnaMakerService) -> Self {
        Self {
            chat_id,
            qna,
            replies: Vec::new(),
        }
    }

    pub fn send(&mut self, reply: Reply) {
        self.replies.push(reply);
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.replies.push(Reply::text(text));
    }

    pub fn send_all(&mut self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.extend(replies);
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn into_replies(self) -> Vec<Reply> {
        self.replies
    }
}

/// Run one step of whichever flow `state` belongs to
pub async fn run_step(
    turn: &mut TurnContext<'_>,
    frame: &mut FlowFrame,
    state: FlowState,
    result: Option<String>,
) -> Result<StepOutcome> {
    match state {
        FlowState::MainMenu(step) => main_menu::run_step(turn, frame, step, result),
        FlowState::Region(step) => region::run_step(turn, frame, step, result).await,
    }
}
