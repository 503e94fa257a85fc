use teloxide::{
    Bot,
    prelude::*,
    types::{ChatId, ChatMemberStatus, UserId},
};

use crate::config::BotConfig;

/// Membership gate against the mandatory channel. A failed lookup counts as
/// not a member; the user can always retry after joining.
pub async fn is_channel_member(bot: &Bot, config: &BotConfig, user_id: i64) -> bool {
    let chat_id = ChatId(config.mandatory_channel_id);
    match bot.get_chat_member(chat_id, UserId(user_id as u64)).await {
        Ok(member) => matches!(
            member.status(),
            ChatMemberStatus::Owner | ChatMemberStatus::Administrator | ChatMemberStatus::Member
        ),
        Err(err) => {
            log::warn!("membership check failed for user {}: {}", user_id, err);
            false
        }
    }
}
