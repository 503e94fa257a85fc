use std::env;

/// Everything the bot reads from the environment, loaded once at startup and
/// injected from there; handlers never reach for env vars themselves.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// The one distinguished admin identity, fixed for the process lifetime.
    pub admin_user_id: i64,
    pub mandatory_channel_id: i64,
    pub group_join_link: String,
    pub free_trial_limit: u32,
    pub cost_per_search: i64,
    pub search_cooldown_ms: i64,
    pub maintenance_mode: bool,
    pub name_finder_url: String,
    pub aadhaar_finder_url: String,
    pub support_contact: String,
    pub min_topup: i64,
}

impl BotConfig {
    pub fn from_env() -> Self {
        let admin_user_id = env::var("ADMIN_USER_ID")
            .expect("ADMIN_USER_ID environment variable not found")
            .parse()
            .expect("ADMIN_USER_ID must be an integer user id");
        let mandatory_channel_id = env::var("MANDATORY_CHANNEL_ID")
            .expect("MANDATORY_CHANNEL_ID environment variable not found")
            .parse()
            .expect("MANDATORY_CHANNEL_ID must be an integer chat id");
        let group_join_link =
            env::var("GROUP_JOIN_LINK").expect("GROUP_JOIN_LINK environment variable not found");
        let name_finder_url = env::var("APISUITE_NAMEFINDER")
            .expect("APISUITE_NAMEFINDER environment variable not found");
        let aadhaar_finder_url = env::var("APISUITE_AADHAAR")
            .expect("APISUITE_AADHAAR environment variable not found");

        Self {
            admin_user_id,
            mandatory_channel_id,
            group_join_link,
            free_trial_limit: env_or("FREE_TRIAL_LIMIT", "1")
                .parse()
                .expect("FREE_TRIAL_LIMIT must be an integer"),
            cost_per_search: env_or("COST_PER_SEARCH", "2")
                .parse()
                .expect("COST_PER_SEARCH must be an integer"),
            search_cooldown_ms: env_or("SEARCH_COOLDOWN_MS", "2000")
                .parse()
                .expect("SEARCH_COOLDOWN_MS must be an integer"),
            maintenance_mode: env_or("MAINTENANCE_MODE", "0") == "1",
            name_finder_url,
            aadhaar_finder_url,
            support_contact: env_or("SUPPORT_CONTACT", "@support"),
            min_topup: env_or("MIN_TOPUP", "25")
                .parse()
                .expect("MIN_TOPUP must be an integer"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
