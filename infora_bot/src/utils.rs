//! Utility functions for infora_bot.

use anyhow::Result;
use teloxide::{
    Bot,
    prelude::*,
    types::{ChatId, InputFile},
};

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Deliver a plain-text report as a document so long JSON does not flood the
/// chat; falls back to a regular message when the upload is rejected.
pub async fn send_text_report(
    bot: &Bot,
    chat_id: ChatId,
    filename: &str,
    content: &str,
    caption: &str,
) -> Result<()> {
    let document = InputFile::memory(content.as_bytes().to_vec()).file_name(filename.to_string());
    match bot.send_document(chat_id, document).caption(caption).await {
        Ok(_) => Ok(()),
        Err(err) => {
            log::error!("Error sending document: {}", err);
            bot.send_message(chat_id, format!("{}\n\n{}", caption, content))
                .await?;
            Ok(())
        }
    }
}
