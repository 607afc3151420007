//! Help command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::utils::errors::Result;

pub const HELP_TEXT: &str = "🤖 RegionBuddy Help\n\n\
    /start - Start over from the state menu\n\
    /help - Show this help message\n\
    /cancel - Stop the current conversation\n\n\
    Pick a state, then a city. Choose \"Other\" in the city menu to ask a question.";

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}
