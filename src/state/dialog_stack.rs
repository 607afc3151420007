//! Dialog stack engine
//!
//! Drives the flows of a [`ConversationContext`] one turn at a time: resumes
//! the suspended frame with the user's reply, runs steps until the next
//! prompt, and handles nested calls, replacement and restarts.

use chrono::Duration;
use tracing::{debug, info};

use super::context::{ConversationContext, FlowFrame};
use crate::config::MAX_STATE_TTL_SECONDS;
use crate::dialogs::{self, FlowKind, FlowState, StepOutcome, TurnContext};
use crate::models::Reply;
use crate::services::QnaMakerService;
use crate::utils::errors::{RegionBuddyError, Result};
use crate::utils::helpers::normalize_whitespace;
use crate::utils::logging::log_flow_transition;

pub const HELP_MESSAGE: &str = "Show Help...";
pub const CANCEL_MESSAGE: &str = "Cancelling...";

/// Upper bound on steps run without suspending in a single turn
const MAX_TRANSITIONS: usize = 64;

#[derive(Debug, Clone)]
pub struct DialogStack {
    root: FlowKind,
    ttl: Duration,
    max_transitions: usize,
}

impl DialogStack {
    /// `ttl_seconds` is clamped to the longest lifetime configuration accepts
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            root: FlowKind::MainMenu,
            ttl: Duration::seconds(ttl_seconds.min(MAX_STATE_TTL_SECONDS) as i64),
            max_transitions: MAX_TRANSITIONS,
        }
    }

    pub fn root(&self) -> FlowKind {
        self.root
    }

    /// Begin `flow` on top of the current stack and run it to its first prompt
    pub async fn begin(
        &self,
        context: &mut ConversationContext,
        flow: FlowKind,
        options: Option<String>,
        qna: &QnaMakerService,
    ) -> Result<Vec<Reply>> {
        info!(chat_id = context.chat_id, flow = flow.name(), "Beginning flow");
        let mut turn = TurnContext::new(context.chat_id, qna);
        context.push_frame(FlowFrame::new(flow, options));
        self.drive(context, &mut turn, None).await?;
        context.refresh_expiry(self.ttl);
        Ok(turn.into_replies())
    }

    /// Feed one user reply into the conversation.
    ///
    /// With an empty stack the reply starts the root flow instead of
    /// answering anything.
    pub async fn continue_turn(
        &self,
        context: &mut ConversationContext,
        input: &str,
        qna: &QnaMakerService,
    ) -> Result<Vec<Reply>> {
        if !context.is_active() {
            return self.begin(context, self.root, None, qna).await;
        }

        let chat_id = context.chat_id;
        let mut turn = TurnContext::new(chat_id, qna);

        if self.interrupt(context, &mut turn, input) {
            context.refresh_expiry(self.ttl);
            return Ok(turn.into_replies());
        }

        let frame = context.active_frame_mut().ok_or_else(|| RegionBuddyError::InvalidStateTransition {
            from: "empty_stack".to_string(),
            to: "reply".to_string(),
        })?;
        let prompt = frame.pending.clone().ok_or_else(|| RegionBuddyError::InvalidStateTransition {
            from: frame.state.to_string(),
            to: "reply".to_string(),
        })?;

        match prompt.recognize(input) {
            Some(value) => {
                frame.pending = None;
                self.drive(context, &mut turn, Some(value)).await?;
            }
            None => {
                debug!(chat_id = chat_id, state = %frame.state, "Reply not recognized, re-prompting");
                turn.send_all(prompt.render());
            }
        }

        context.refresh_expiry(self.ttl);
        Ok(turn.into_replies())
    }

    /// End every flow for the conversation
    pub fn cancel_all(&self, context: &mut ConversationContext) {
        info!(chat_id = context.chat_id, depth = context.stack.len(), "Cancelling all flows");
        context.clear_stack();
    }

    /// Handle "help" and "cancel" while an interruptible flow is running
    fn interrupt(&self, context: &mut ConversationContext, turn: &mut TurnContext<'_>, input: &str) -> bool {
        if !context.stack.iter().any(|f| f.flow.is_interruptible()) {
            return false;
        }

        match normalize_whitespace(input).to_lowercase().as_str() {
            "help" | "?" => {
                turn.send_text(HELP_MESSAGE);
                true
            }
            "cancel" | "quit" => {
                turn.send_text(CANCEL_MESSAGE);
                self.cancel_all(context);
                true
            }
            _ => false,
        }
    }

    /// Run steps until a prompt suspends the stack or it empties
    async fn drive(
        &self,
        context: &mut ConversationContext,
        turn: &mut TurnContext<'_>,
        mut result: Option<String>,
    ) -> Result<()> {
        let chat_id = context.chat_id;

        for _ in 0..self.max_transitions {
            let (state, outcome) = {
                let frame = match context.active_frame_mut() {
                    Some(frame) => frame,
                    None => return Ok(()),
                };
                let state = frame.state;
                let outcome = dialogs::run_step(turn, frame, state, result.take()).await?;
                (state, outcome)
            };

            match outcome {
                StepOutcome::Prompt { prompt, resume } => {
                    check_same_flow(state, resume)?;
                    turn.send_all(prompt.render());
                    if let Some(frame) = context.active_frame_mut() {
                        frame.state = resume;
                        frame.pending = Some(prompt);
                    }
                    log_flow_transition(chat_id, &state.to_string(), &format!("{} (waiting)", resume));
                    return Ok(());
                }
                StepOutcome::Continue { next, result: next_result } => {
                    check_same_flow(state, next)?;
                    if let Some(frame) = context.active_frame_mut() {
                        frame.state = next;
                    }
                    log_flow_transition(chat_id, &state.to_string(), &next.to_string());
                    result = next_result;
                }
                StepOutcome::Call { flow, resume } => {
                    check_same_flow(state, resume)?;
                    if let Some(frame) = context.active_frame_mut() {
                        frame.state = resume;
                    }
                    log_flow_transition(chat_id, &state.to_string(), &flow.initial_state().to_string());
                    context.push_frame(FlowFrame::new(flow, None));
                }
                StepOutcome::Replace { flow, options } => {
                    context.pop_frame();
                    log_flow_transition(chat_id, &state.to_string(), &flow.initial_state().to_string());
                    context.push_frame(FlowFrame::new(flow, options));
                }
                StepOutcome::End { result: end_result } => {
                    context.pop_frame();
                    result = end_result;
                }
            }
        }

        Err(RegionBuddyError::InvalidStateTransition {
            from: context
                .active_frame()
                .map(|f| f.state.to_string())
                .unwrap_or_else(|| "empty_stack".to_string()),
            to: format!("more than {} steps without a prompt", self.max_transitions),
        })
    }
}

/// Steps may only move within their own flow
fn check_same_flow(from: FlowState, to: FlowState) -> Result<()> {
    if from.kind() != to.kind() {
        return Err(RegionBuddyError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}
