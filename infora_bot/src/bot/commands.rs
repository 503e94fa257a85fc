use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Show the welcome message.")]
    Start,
    #[command(description = "Look up a phone number.")]
    Num(String),
    #[command(description = "Show your balance and free searches left.")]
    Balance,
    #[command(description = "How to buy credits.")]
    Donate,
    #[command(description = "Contact support.")]
    Support,
    #[command(description = "How to buy API access.")]
    Buyapi,
    #[command(description = "Redeem an activation token.")]
    Redeem(String),
    #[command(description = "Open the admin panel (admin only).")]
    Admin,
    #[command(description = "Mint an activation token (admin only).")]
    GenToken(String),
}
