//! Message handlers module
//!
//! Handles incoming text messages in private chats

use teloxide::{Bot, types::Message, prelude::*};
use tracing::debug;
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::handlers::turn::{is_conversation_chat, run_user_turn};

pub const TEXT_ONLY_MESSAGE: &str = "Please reply with text or use the buttons.";

/// Handle incoming text messages
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;

    if !is_conversation_chat(chat_id) {
        debug!(chat_id = ?chat_id, "Ignoring message outside private chat");
        return Ok(());
    }

    match msg.text() {
        Some(text) => run_user_turn(&bot, &services, chat_id, text).await,
        None => {
            bot.send_message(chat_id, TEXT_ONLY_MESSAGE).await?;
            Ok(())
        }
    }
}
