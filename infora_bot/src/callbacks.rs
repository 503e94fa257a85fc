//! Callback query handlers for infora_bot.

use anyhow::Result;
use teloxide::{prelude::*, types::CallbackQuery};

use crate::admin::handler::handle_admin_callback;
use crate::dependencies::BotDependencies;

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    bot_deps: BotDependencies,
) -> Result<()> {
    let data = match &query.data {
        Some(data) => data.clone(),
        None => return Ok(()),
    };

    if data == "try_num" {
        bot.answer_callback_query(query.id.clone()).await?;
        if let Some(teloxide::types::MaybeInaccessibleMessage::Regular(message)) = &query.message {
            bot.send_message(message.chat.id, "To search a number use: /num <phone>")
                .await?;
        }
    } else if let Some(action) = data.strip_prefix("admin_") {
        handle_admin_callback(bot, query.clone(), action, bot_deps).await?;
    }

    Ok(())
}
