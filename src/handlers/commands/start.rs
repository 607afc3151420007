//! Start and cancel command handlers

use teloxide::{Bot, types::Message, prelude::*};
use tracing::{debug, info};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::handlers::turn::{
    cancel_conversation, deliver_replies, handle_turn_error, is_conversation_chat, restart_conversation,
};

pub const CANCELLED_MESSAGE: &str = "Conversation cancelled. Send any message to start again.";
pub const PRIVATE_ONLY_MESSAGE: &str = "Please message me directly to pick a state.";

/// Handle /start command - begin the state menu from scratch
pub async fn handle_start(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    debug!(chat_id = ?chat_id, "Processing /start command");

    if !is_conversation_chat(chat_id) {
        bot.send_message(chat_id, PRIVATE_ONLY_MESSAGE).await?;
        return Ok(());
    }

    let replies = match restart_conversation(&services, chat_id.0).await {
        Ok(replies) => {
            info!(chat_id = ?chat_id, "Conversation started");
            replies
        }
        Err(e) => handle_turn_error(&services, chat_id.0, &e).await,
    };

    deliver_replies(&bot, chat_id, &replies).await
}

/// Handle /cancel command
pub async fn handle_cancel(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    if !is_conversation_chat(chat_id) {
        bot.send_message(chat_id, PRIVATE_ONLY_MESSAGE).await?;
        return Ok(());
    }
    cancel_conversation(&services, chat_id.0).await?;
    bot.send_message(chat_id, CANCELLED_MESSAGE).await?;
    Ok(())
}
