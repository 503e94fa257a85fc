use teloxide::prelude::*;

mod admin;
mod bot;
mod callbacks;
mod config;
mod dependencies;
mod lookup;
mod middleware;
mod utils;

use crate::bot::handler_tree::handler_tree;
use crate::config::BotConfig;
use crate::dependencies::BotDependencies;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    log::info!("Starting infora_bot...");

    let config = BotConfig::from_env();
    let db = sled::open("infora_db").expect("Failed to open sled DB");
    let bot_deps = BotDependencies::new(&db, config).expect("Failed to open ledger trees");

    let bot = Bot::from_env();

    Dispatcher::builder(bot, handler_tree())
        .dependencies(dptree::deps![bot_deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
