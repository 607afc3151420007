//! State management module
//!
//! This module handles conversation state, its persistence between turns and
//! the dialog stack that drives flows.

pub mod context;
pub mod dialog_stack;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, ContextSummary, FlowFrame};
pub use dialog_stack::DialogStack;
pub use storage::StateStorage;
