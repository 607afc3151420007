//! Conversation context management
//!
//! Each chat owns a stack of flow frames. The bottom frame is the root menu;
//! nested flows are pushed above it and popped when they end.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};
use tracing::warn;

use crate::dialogs::{FlowKind, FlowState, Prompt};
use crate::utils::errors::Result;

/// One running flow on the stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFrame {
    pub flow: FlowKind,
    /// Step to run when the frame next resumes
    pub state: FlowState,
    /// Value the flow was begun with, e.g. a greeting
    pub options: Option<String>,
    /// Step values accumulated during this pass through the flow
    pub values: HashMap<String, serde_json::Value>,
    /// Prompt awaiting a reply, if suspended
    pub pending: Option<Prompt>,
}

impl FlowFrame {
    pub fn new(flow: FlowKind, options: Option<String>) -> Self {
        Self {
            flow,
            state: flow.initial_state(),
            options,
            values: HashMap::new(),
            pending: None,
        }
    }

    /// Set a step value
    pub fn set_value<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a step value
    pub fn get_value<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Get string value (convenience method)
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_value::<String>(key).unwrap_or(None)
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }
}

/// Per-chat conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Chat this context belongs to
    pub chat_id: i64,
    /// Active flows, innermost last
    pub stack: Vec<FlowFrame>,
    /// When this context expires (for cleanup)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            stack: Vec::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether any flow is running
    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn active_frame(&self) -> Option<&FlowFrame> {
        self.stack.last()
    }

    pub fn active_frame_mut(&mut self) -> Option<&mut FlowFrame> {
        self.stack.last_mut()
    }

    pub fn push_frame(&mut self, frame: FlowFrame) {
        self.stack.push(frame);
        self.updated_at = Utc::now();
    }

    pub fn pop_frame(&mut self) -> Option<FlowFrame> {
        self.updated_at = Utc::now();
        self.stack.pop()
    }

    /// Drop every frame and its step values
    pub fn clear_stack(&mut self) {
        self.stack.clear();
        self.updated_at = Utc::now();
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }

    /// Push the expiry `ttl` into the future from now.
    ///
    /// A `ttl` past the representable range leaves the context without an
    /// expiry; storage then applies its own default TTL.
    pub fn refresh_expiry(&mut self, ttl: Duration) {
        let now = Utc::now();
        self.expires_at = now.checked_add_signed(ttl);
        if self.expires_at.is_none() {
            warn!(chat_id = self.chat_id, ttl_seconds = ttl.num_seconds(), "Expiry out of range, using storage default");
        }
        self.updated_at = now;
    }

    /// Set custom expiry time
    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Create a summary of the context for logging
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            chat_id: self.chat_id,
            stack: self.stack.iter().map(|f| f.state.to_string()).collect(),
            waiting: self.active_frame().map_or(false, FlowFrame::is_waiting),
            expires_at: self.expires_at,
        }
    }
}

/// Context summary for logging and debugging
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub chat_id: i64,
    pub stack: Vec<String>,
    pub waiting: bool,
    pub expires_at: Option<DateTime<Utc>>,
}
