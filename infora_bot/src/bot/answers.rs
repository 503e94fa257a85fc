use anyhow::Result;
use teloxide::{Bot, prelude::*, types::Message};

use crate::admin::handler::{handle_admin_panel, handle_gen_token};
use crate::bot::commands::Command;
use crate::bot::handler::{
    handle_balance, handle_num, handle_redeem, handle_start, handle_support,
};
use crate::dependencies::BotDependencies;
use crate::middleware::membership::is_channel_member;

pub async fn answers(
    bot: Bot,
    msg: Message,
    cmd: Command,
    bot_deps: BotDependencies,
) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let is_admin = bot_deps.ledger.is_configured_admin(user_id);

    if bot_deps.config.maintenance_mode && !is_admin {
        bot.send_message(
            msg.chat.id,
            "🛠️ MAINTENANCE MODE!\n\nThe bot is under maintenance, please try again later.",
        )
        .await?;
        return Ok(());
    }

    // /start works anywhere; everything else is DM-only.
    if !msg.chat.is_private() && !matches!(cmd, Command::Start) {
        bot.send_message(msg.chat.id, "⚠️ PLEASE USE THIS BOT IN PRIVATE CHAT. ⚠️")
            .await?;
        return Ok(());
    }

    // Mandatory channel membership for everything past /start.
    if !matches!(cmd, Command::Start)
        && !is_admin
        && !is_channel_member(&bot, &bot_deps.config, user_id).await
    {
        let keyboard = crate::bot::handler::join_group_keyboard(&bot_deps.config)?;
        bot.send_message(
            msg.chat.id,
            "⛔️ ACCESS REQUIRED! ⛔️\n\nYOU MUST JOIN THE GROUP TO USE THE BOT.",
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    }

    match cmd {
        Command::Start => handle_start(bot, msg, bot_deps.clone()).await?,
        Command::Num(phone) => handle_num(bot, msg, phone, bot_deps.clone()).await?,
        Command::Balance => handle_balance(bot, msg, bot_deps.clone()).await?,
        Command::Donate | Command::Support | Command::Buyapi => {
            handle_support(bot, msg, bot_deps.clone()).await?
        }
        Command::Redeem(token) => handle_redeem(bot, msg, token, bot_deps.clone()).await?,
        Command::Admin => handle_admin_panel(bot, msg, bot_deps.clone()).await?,
        Command::GenToken(args) => handle_gen_token(bot, msg, args, bot_deps.clone()).await?,
    }

    Ok(())
}
