use anyhow::Result;
use teloxide::{
    Bot,
    dispatching::{DpHandlerDescription, HandlerExt, UpdateFilterExt},
    dptree::{self, Handler},
    types::{Message, Update},
};

use crate::admin::handler::handle_admin_input;
use crate::bot::answers::answers;
use crate::bot::commands::Command;
use crate::callbacks::handle_callback_query;
use crate::dependencies::BotDependencies;

pub fn handler_tree() -> Handler<'static, Result<()>, DpHandlerDescription> {
    dptree::entry()
        .branch(
            Update::filter_message()
                // 1. Intercept the admin's follow-up text while an operation
                //    is pending. This branch must run before command parsing
                //    so the pending operation swallows the next input;
                //    "/admin" itself stays routable to re-open the panel.
                .branch(
                    dptree::entry()
                        .filter(|msg: Message, bot_deps: BotDependencies| {
                            let user_id = match msg.from.as_ref() {
                                Some(user) => user.id.0 as i64,
                                None => return false,
                            };
                            if !bot_deps.ledger.is_configured_admin(user_id) {
                                return false;
                            }
                            let text = match msg.text() {
                                Some(text) => text,
                                None => return false,
                            };
                            if text.trim_start().starts_with("/admin") {
                                return false;
                            }
                            matches!(bot_deps.ledger.pending_operation(user_id), Ok(Some(_)))
                        })
                        .endpoint(handle_admin_input),
                )
                // 2. Regular command handling.
                .branch(dptree::entry().filter_command::<Command>().endpoint(answers)),
        )
        .branch(
            Update::filter_callback_query().endpoint(
                |bot: Bot,
                 query: teloxide::types::CallbackQuery,
                 bot_deps: BotDependencies| async move {
                    handle_callback_query(bot, query, bot_deps).await
                },
            ),
        )
}
