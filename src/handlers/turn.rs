//! Turn processing shared by every update handler
//!
//! Loads the chat's context, runs one dialog turn, persists the result and
//! delivers the replies over Telegram.

use teloxide::{Bot, types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup}, prelude::*};
use tracing::{debug, warn, error};

use crate::models::{ChoiceCard, Reply};
use crate::services::ServiceFactory;
use crate::state::ConversationContext;
use crate::utils::errors::{RegionBuddyError, Result};
use crate::utils::helpers::truncate_text;
use crate::utils::logging::{log_api_error, log_user_action};

pub const ERROR_MESSAGE: &str = "The bot encountered an error or bug.";
pub const ERROR_HINT: &str = "To continue to run this bot, please fix the bot source code.";

/// Conversations only run in private chats with the bot
pub fn is_conversation_chat(chat_id: ChatId) -> bool {
    chat_id.is_user()
}

/// Run one turn for `chat_id` and persist the resulting state
pub async fn process_turn(services: &ServiceFactory, chat_id: i64, input: &str) -> Result<Vec<Reply>> {
    log_user_action(chat_id, "reply", Some(&truncate_text(input, 64)));

    let mut context = services.state_storage.load_context(chat_id).await?
        .unwrap_or_else(|| ConversationContext::new(chat_id));

    let replies = services.dialogs
        .continue_turn(&mut context, input, &services.qna_service)
        .await?;

    persist(services, &context).await?;
    Ok(replies)
}

/// Drop any running flow and begin the root menu from scratch
pub async fn restart_conversation(services: &ServiceFactory, chat_id: i64) -> Result<Vec<Reply>> {
    log_user_action(chat_id, "restart", None);

    let mut context = ConversationContext::new(chat_id);
    let replies = services.dialogs
        .begin(&mut context, services.dialogs.root(), None, &services.qna_service)
        .await?;

    persist(services, &context).await?;
    Ok(replies)
}

/// Drop any running flow
pub async fn cancel_conversation(services: &ServiceFactory, chat_id: i64) -> Result<()> {
    log_user_action(chat_id, "cancel", None);
    services.state_storage.delete_context(chat_id).await
}

/// Turn-level fault handling: log, forget the conversation, apologise
pub async fn handle_turn_error(services: &ServiceFactory, chat_id: i64, err: &RegionBuddyError) -> Vec<Reply> {
    error!(
        chat_id = chat_id,
        error = %err,
        severity = %err.severity(),
        recoverable = err.is_recoverable(),
        "Unhandled error during turn"
    );
    if let RegionBuddyError::Qna(e) = err {
        log_api_error("qna_maker", &e.to_string(), Some("generateAnswer"));
    }

    if let Err(e) = services.state_storage.delete_context(chat_id).await {
        warn!(chat_id = chat_id, error = %e, "Failed to clear conversation state after error");
    }

    vec![Reply::text(ERROR_MESSAGE), Reply::text(ERROR_HINT)]
}

async fn persist(services: &ServiceFactory, context: &ConversationContext) -> Result<()> {
    if context.is_active() {
        services.state_storage.save_context(context).await
    } else {
        services.state_storage.delete_context(context.chat_id).await
    }
}

/// Process a user reply end to end, including error replies
pub async fn run_user_turn(bot: &Bot, services: &ServiceFactory, chat_id: ChatId, input: &str) -> Result<()> {
    let replies = match process_turn(services, chat_id.0, input).await {
        Ok(replies) => replies,
        Err(e) => handle_turn_error(services, chat_id.0, &e).await,
    };
    deliver_replies(bot, chat_id, &replies).await
}

/// Send replies in order
pub async fn deliver_replies(bot: &Bot, chat_id: ChatId, replies: &[Reply]) -> Result<()> {
    for reply in replies {
        match reply {
            Reply::Text { text } => {
                bot.send_message(chat_id, text.as_str()).await?;
            }
            Reply::Card { card } => {
                bot.send_message(chat_id, card.to_plain_text())
                    .reply_markup(choice_keyboard(card))
                    .await?;
            }
        }
    }
    debug!(chat_id = ?chat_id, count = replies.len(), "Replies delivered");
    Ok(())
}

/// One button per row; pressing a button submits its title
pub fn choice_keyboard(card: &ChoiceCard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        card.actions
            .iter()
            .map(|action| vec![InlineKeyboardButton::callback(action.title.clone(), action.data.clone())])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_only_private_chats_hold_conversations() {
        assert!(is_conversation_chat(ChatId(123_456)));
        assert!(!is_conversation_chat(ChatId(-42)));
        assert!(!is_conversation_chat(ChatId(-1_001_234_567_890)));
    }

    #[test]
    fn test_keyboard_buttons_submit_their_labels() {
        let card = ChoiceCard::from_labels(&["Mumbai", "Other"]);
        let keyboard = choice_keyboard(&card);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        for row in &keyboard.inline_keyboard {
            assert_eq!(row.len(), 1);
            match &row[0].kind {
                InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, &row[0].text),
                other => panic!("unexpected button kind: {:?}", other),
            }
        }
    }
}
