//! Test helpers module
//!
//! Mock collaborators and a unified test context for driving conversations.

#![allow(dead_code)]

pub mod qna_mock;
pub mod test_context;

pub use qna_mock::*;
pub use test_context::*;
