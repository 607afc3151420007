//! Data models module
//!
//! Channel-independent message types exchanged between dialogs and handlers.

pub mod card;
pub mod reply;

pub use card::{CardAction, ChoiceCard};
pub use reply::Reply;
