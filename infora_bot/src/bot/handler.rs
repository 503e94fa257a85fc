//! Handlers for the user-facing commands.

use anyhow::Result;
use infora_core::activation::dto::RedemptionResult;
use infora_core::cooldown::remaining_secs;
use infora_core::ledger::dto::{ChargeOutcome, ChargeType};
use infora_core::search_log::dto::SearchLogEntry;
use teloxide::{
    Bot,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message},
};

use crate::config::BotConfig;
use crate::dependencies::BotDependencies;
use crate::middleware::membership::is_channel_member;
use crate::utils::{now_millis, send_text_report};

pub fn join_group_keyboard(config: &BotConfig) -> Result<InlineKeyboardMarkup> {
    let join_url = reqwest::Url::parse(&config.group_join_link)?;
    Ok(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url("🔒 JOIN MANDATORY GROUP", join_url),
    ]]))
}

fn contact_url(config: &BotConfig) -> Result<reqwest::Url> {
    let handle = config.support_contact.trim_start_matches('@');
    Ok(reqwest::Url::parse(&format!("https://t.me/{}", handle))?)
}

pub async fn handle_start(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    let config = &bot_deps.config;
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);
    let member = is_channel_member(&bot, config, user_id).await
        || bot_deps.ledger.is_configured_admin(user_id);

    if !member {
        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::url(
                "🔒 JOIN MANDATORY GROUP",
                reqwest::Url::parse(&config.group_join_link)?,
            )],
            vec![InlineKeyboardButton::callback("🔎 Try /num", "try_num")],
        ]);
        bot.send_message(
            msg.chat.id,
            "👋 WELCOME TO INFORA PRO! You MUST JOIN THE GROUP to use commands:",
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    }

    let start_text = format!(
        "┏━━✨ INFORA PRO ✨━━┓\n\n\
         👋 Hey! I'm your OSINT/Search copilot — fast, precise & private.\n\
         📊 {} FREE TRIAL SEARCH{}\n\
         • Each search costs {} credits 💳\n\
         • Works in DM only, for privacy 👥🔐\n\n\
         🔎 Basic Lookups\n\
         • /num <phone> — 10-digit mobile details\n\
         • /balance — credits and free searches left\n\
         • /redeem <token> — activate a bonus token\n\n\
         ⚡️ Support: {}\n\
         🌐 Stay Safe • Respect Privacy • Use Responsibly 🚀",
        config.free_trial_limit,
        if config.free_trial_limit == 1 { "" } else { "ES" },
        config.cost_per_search,
        config.support_contact,
    );
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🔎 Try /num", "try_num")],
        vec![
            InlineKeyboardButton::url("💳 Buy Credits", contact_url(config)?),
            InlineKeyboardButton::url("📩 Contact Owner", contact_url(config)?),
        ],
    ]);
    bot.send_message(msg.chat.id, start_text)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

pub async fn handle_balance(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let account = bot_deps.ledger.get_or_create(user_id)?;
    let free_left = account.free_searches_left(bot_deps.config.free_trial_limit);
    bot.send_message(
        msg.chat.id,
        format!("💰 BALANCE: {} TK\nFREE USES LEFT: {}", account.balance, free_left),
    )
    .await?;
    Ok(())
}

pub async fn handle_support(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    bot.send_message(
        msg.chat.id,
        format!("✨ SUPPORT: DM {}", bot_deps.config.support_contact),
    )
    .await?;
    Ok(())
}

pub async fn handle_redeem(
    bot: Bot,
    msg: Message,
    token: String,
    bot_deps: BotDependencies,
) -> Result<()> {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let token = token.trim();
    if token.is_empty() {
        bot.send_message(msg.chat.id, "👉 INPUT MISSING! Use: /redeem <token>")
            .await?;
        return Ok(());
    }

    let reply = match bot_deps.activation.redeem(token, user_id)? {
        RedemptionResult::Success { credit_granted } => format!(
            "🎁 Token redeemed! {} bonus search{} added to your account.",
            credit_granted,
            if credit_granted == 1 { "" } else { "es" }
        ),
        RedemptionResult::AlreadyUsed => "⚠️ This token has already been used.".to_string(),
        RedemptionResult::NotFoundOrExpired => "❌ Unknown or expired token.".to_string(),
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub async fn handle_num(
    bot: Bot,
    msg: Message,
    phone: String,
    bot_deps: BotDependencies,
) -> Result<()> {
    let config = &bot_deps.config;
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let phone = phone.split_whitespace().next().unwrap_or("").to_string();
    if phone.is_empty() {
        bot.send_message(msg.chat.id, "👉 INPUT MISSING! Use: /num <phone>")
            .await?;
        return Ok(());
    }

    // Blocked numbers short-circuit before any entitlement is touched, so a
    // blocked search never costs anything.
    if bot_deps.blocklist.is_blocked(&phone)? {
        bot_deps.search_logs.append(&SearchLogEntry {
            user_id,
            target: phone.clone(),
            timestamp: now_millis(),
            outcome_summary: "blocked".to_string(),
            cost_charged: 0,
            was_blocked: true,
        })?;
        bot.send_message(msg.chat.id, "🚫 This number is blocked from searches.")
            .await?;
        return Ok(());
    }

    let charge = match bot_deps.ledger.evaluate_and_charge(
        user_id,
        config.cost_per_search,
        config.free_trial_limit,
        config.search_cooldown_ms,
        now_millis(),
    )? {
        ChargeOutcome::Allowed(charge) => charge,
        ChargeOutcome::CooldownActive { remaining_ms } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "⏱️ Please wait {}s before next search.",
                    remaining_secs(remaining_ms)
                ),
            )
            .await?;
            return Ok(());
        }
        ChargeOutcome::AccountSuspended => {
            bot.send_message(msg.chat.id, "⚠️ ACCOUNT SUSPENDED! 🚫\n\nCONTACT ADMIN.")
                .await?;
            return Ok(());
        }
        ChargeOutcome::InsufficientFunds => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "⚠️ INSUFFICIENT BALANCE!\n\n\
                     YOU HAVE USED YOUR {} FREE SEARCH{}.\n\
                     RECHARGE MINIMUM ₹{} TO CONTINUE.\n\
                     CONTACT: {}",
                    config.free_trial_limit,
                    if config.free_trial_limit == 1 { "" } else { "ES" },
                    config.min_topup,
                    config.support_contact,
                ),
            )
            .await?;
            return Ok(());
        }
    };

    if charge.charge_type != ChargeType::AdminExempt {
        bot.send_message(
            msg.chat.id,
            format!(
                "💳 Transaction processed. COST: {} TK. BALANCE: {} TK. FREE LEFT: {}.",
                charge.cost, charge.balance, charge.free_searches_left
            ),
        )
        .await?;
    }
    bot.send_message(msg.chat.id, format!("🔎 Searching for: {}", phone))
        .await?;

    match bot_deps.lookup.lookup_number(&phone).await {
        Ok(report) => {
            let filename = format!("num_report_{}.txt", phone);
            send_text_report(
                &bot,
                msg.chat.id,
                &filename,
                &report.render_text(),
                "✅ Report generated for phone number.",
            )
            .await?;
            bot_deps.search_logs.append(&SearchLogEntry {
                user_id,
                target: phone,
                timestamp: now_millis(),
                outcome_summary: report.outcome_summary(),
                cost_charged: charge.cost,
                was_blocked: false,
            })?;
        }
        Err(err) => {
            log::error!("lookup failed for {}: {}", phone, err);
            // The charge and the lookup are separate steps; refund the
            // charge instead of leaving the user paying for nothing. If the
            // reversal itself fails it is logged for manual reconciliation,
            // not retried.
            if let Err(reverse_err) =
                bot_deps
                    .ledger
                    .reverse_charge(user_id, charge.charge_type, charge.cost)
            {
                log::error!(
                    "charge reversal failed for user {}: {} (manual reconciliation needed)",
                    user_id,
                    reverse_err
                );
            }
            bot_deps.search_logs.append(&SearchLogEntry {
                user_id,
                target: phone,
                timestamp: now_millis(),
                outcome_summary: "providers unreachable, charge reversed".to_string(),
                cost_charged: 0,
                was_blocked: false,
            })?;
            bot.send_message(
                msg.chat.id,
                "❌ API error. Your charge was refunded, please try again later.",
            )
            .await?;
        }
    }

    Ok(())
}
