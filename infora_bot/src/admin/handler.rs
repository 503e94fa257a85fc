//! Admin panel UI: the inline keyboard, the callback that arms a pending
//! operation, and the rendering of state-machine outcomes.

use anyhow::Result;
use infora_core::admin::dto::{AdminOperation, OperationResult};
use teloxide::{
    Bot,
    prelude::*,
    types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message},
};

use crate::dependencies::BotDependencies;
use crate::utils::send_text_report;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const MAX_TOKEN_TTL_HOURS: i64 = 720;

fn admin_panel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("➕ ADD CREDIT", "admin_add_credit"),
            InlineKeyboardButton::callback("➖ REMOVE CREDIT", "admin_remove_credit"),
        ],
        vec![
            InlineKeyboardButton::callback("🛑 SUSPEND USER", "admin_suspend"),
            InlineKeyboardButton::callback("🟢 UNBAN USER", "admin_unban"),
        ],
        vec![
            InlineKeyboardButton::callback("👤 CHECK STATUS", "admin_status"),
            InlineKeyboardButton::callback("📝 VIEW LOGS", "admin_view_logs"),
        ],
        vec![
            InlineKeyboardButton::callback("🔒 ADD BLOCK", "admin_add_block"),
            InlineKeyboardButton::callback("🔓 REMOVE BLOCK", "admin_remove_block"),
        ],
        vec![InlineKeyboardButton::callback("🎁 ADD BONUS", "admin_add_bonus")],
    ])
}

fn operation_from_action(action: &str) -> Option<AdminOperation> {
    match action {
        "add_credit" => Some(AdminOperation::AddCredit),
        "remove_credit" => Some(AdminOperation::RemoveCredit),
        "suspend" => Some(AdminOperation::Suspend),
        "unban" => Some(AdminOperation::Unban),
        "status" => Some(AdminOperation::StatusQuery),
        "view_logs" => Some(AdminOperation::ViewLogs),
        "add_block" => Some(AdminOperation::AddBlock),
        "remove_block" => Some(AdminOperation::RemoveBlock),
        "add_bonus" => Some(AdminOperation::AddBonus),
        _ => None,
    }
}

pub async fn handle_admin_panel(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    if !bot_deps.ledger.is_configured_admin(user_id) {
        bot.send_message(msg.chat.id, "❌ ADMIN ACCESS DENIED.").await?;
        return Ok(());
    }
    bot.send_message(msg.chat.id, "Admin Panel:")
        .reply_markup(admin_panel_keyboard())
        .await?;
    Ok(())
}

/// An `admin_*` panel button: arm the matching pending operation and prompt
/// with the expected input format.
pub async fn handle_admin_callback(
    bot: Bot,
    query: CallbackQuery,
    action: &str,
    bot_deps: BotDependencies,
) -> Result<()> {
    bot.answer_callback_query(query.id.clone()).await?;
    let chat_id = match &query.message {
        Some(teloxide::types::MaybeInaccessibleMessage::Regular(message)) => message.chat.id,
        _ => return Ok(()),
    };
    let admin_id = query.from.id.0 as i64;

    let op = match operation_from_action(action) {
        Some(op) => op,
        None => {
            bot.send_message(chat_id, "Unknown admin action.").await?;
            return Ok(());
        }
    };
    if !bot_deps.admin.begin(admin_id, op)? {
        bot.send_message(chat_id, "❌ ADMIN ACCESS DENIED.").await?;
        return Ok(());
    }
    bot.send_message(chat_id, op.format_hint()).await?;
    Ok(())
}

/// The freeform text following a panel selection. The state machine clears
/// the pending operation whatever happens; this only renders its outcome.
pub async fn handle_admin_input(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let text = msg.text().unwrap_or_default();

    match bot_deps.admin.consume(user_id, text)? {
        OperationResult::NotAdmin | OperationResult::NoPendingOperation => {}
        OperationResult::MalformedInput { expected } => {
            bot.send_message(msg.chat.id, format!("INVALID FORMAT. Use: {}", expected))
                .await?;
        }
        OperationResult::BalanceAdjusted {
            target,
            delta,
            new_balance,
        } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "SUCCESS: {} TK {} USER {} (BALANCE: {} TK)",
                    delta.abs(),
                    if delta >= 0 { "ADDED TO" } else { "REMOVED FROM" },
                    target,
                    new_balance
                ),
            )
            .await?;
        }
        OperationResult::BonusAdjusted {
            target,
            delta,
            new_bonus,
        } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "SUCCESS: {} BONUS SEARCHES {} USER {} (TOTAL: {})",
                    delta.abs(),
                    if delta >= 0 { "ADDED TO" } else { "REMOVED FROM" },
                    target,
                    new_bonus
                ),
            )
            .await?;
        }
        OperationResult::SuspensionSet { target, suspended } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "SUCCESS: USER {} {}",
                    target,
                    if suspended { "SUSPENDED" } else { "UNBANNED" }
                ),
            )
            .await?;
        }
        OperationResult::Status { target, account } => {
            let report = match account {
                Some(account) => serde_json::to_string_pretty(&account)?,
                None => serde_json::to_string_pretty(
                    &serde_json::json!({ "user_id": target, "msg": "No record" }),
                )?,
            };
            bot.send_message(msg.chat.id, format!("USER STATUS:\n{}", report))
                .await?;
        }
        OperationResult::Logs(entries) => {
            let count = entries.len();
            let filename = format!("logs_last_{}.txt", count);
            let content = serde_json::to_string_pretty(&entries)?;
            let caption = format!("Last {} logs", count);
            send_text_report(&bot, msg.chat.id, &filename, &content, &caption).await?;
        }
        OperationResult::NumberBlocked { number } => {
            bot.send_message(msg.chat.id, format!("Blocked {}", number))
                .await?;
        }
        OperationResult::NumberUnblocked { number, was_present } => {
            let reply = if was_present {
                format!("Unblocked {}", number)
            } else {
                format!("{} was not blocked", number)
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
    }

    Ok(())
}

/// `/gentoken <amount> [hours]` — mint a one-time bonus token. Sweeps dead
/// tokens opportunistically while it is at it.
pub async fn handle_gen_token(
    bot: Bot,
    msg: Message,
    args: String,
    bot_deps: BotDependencies,
) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    if !bot_deps.ledger.is_configured_admin(user_id) {
        bot.send_message(msg.chat.id, "❌ ADMIN ACCESS DENIED.").await?;
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    let usage = "👉 Use: /gentoken <amount> [hours]";
    if parts.is_empty() || parts.len() > 2 {
        bot.send_message(msg.chat.id, usage).await?;
        return Ok(());
    }
    let amount: u32 = match parts[0].parse() {
        Ok(amount) if amount > 0 => amount,
        _ => {
            bot.send_message(msg.chat.id, usage).await?;
            return Ok(());
        }
    };
    let hours = if parts.len() == 2 {
        match parts[1].parse::<i64>() {
            Ok(hours) => hours.clamp(1, MAX_TOKEN_TTL_HOURS),
            Err(_) => {
                bot.send_message(msg.chat.id, usage).await?;
                return Ok(());
            }
        }
    } else {
        DEFAULT_TOKEN_TTL_HOURS
    };

    let purged = bot_deps.activation.purge_expired()?;
    if purged > 0 {
        log::info!("purged {} expired activation tokens", purged);
    }

    let token = bot_deps.activation.issue(user_id, amount, hours * 3600)?;
    bot.send_message(
        msg.chat.id,
        format!(
            "🎁 Activation token minted:\n<code>{}</code>\n\
             Worth {} bonus searches, valid for {}h. Redeem with /redeem.",
            token.token, token.credit_amount, hours
        ),
    )
    .parse_mode(teloxide::types::ParseMode::Html)
    .await?;
    Ok(())
}
