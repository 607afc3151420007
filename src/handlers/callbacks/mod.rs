//! Callback query handlers module
//!
//! Inline keyboard buttons carry their own label as callback data, so a button
//! press is handled exactly like the user typing that label.

use teloxide::{Bot, types::{CallbackQuery, ChatId}, prelude::*};
use tracing::{debug, warn};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::handlers::turn::{is_conversation_chat, run_user_turn};

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId(user_id));

    debug!(user_id = user_id, chat_id = ?chat_id, callback_data = ?query.data, "Processing callback query");

    // Answer the callback query first to remove loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    if !is_conversation_chat(chat_id) {
        debug!(chat_id = ?chat_id, "Ignoring callback outside private chat");
        return Ok(());
    }

    match query.data.as_deref() {
        Some(data) => run_user_turn(&bot, &services, chat_id, data).await,
        None => {
            warn!(user_id = user_id, "Callback query without data");
            Ok(())
        }
    }
}
