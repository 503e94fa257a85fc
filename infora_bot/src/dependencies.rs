use infora_core::activation::Activation;
use infora_core::admin::Admin;
use infora_core::blocklist::Blocklist;
use infora_core::ledger::Ledger;
use infora_core::search_log::SearchLogs;

use crate::config::BotConfig;
use crate::lookup::Lookup;

#[derive(Clone)]
pub struct BotDependencies {
    pub config: BotConfig,
    pub ledger: Ledger,
    pub admin: Admin,
    pub blocklist: Blocklist,
    pub activation: Activation,
    pub search_logs: SearchLogs,
    pub lookup: Lookup,
}

impl BotDependencies {
    pub fn new(db: &sled::Db, config: BotConfig) -> sled::Result<Self> {
        let ledger = Ledger::new(db, config.admin_user_id)?;
        let blocklist = Blocklist::new(db)?;
        let search_logs = SearchLogs::new(db)?;
        let admin = Admin::new(ledger.clone(), blocklist.clone(), search_logs.clone());
        let activation = Activation::new(db, ledger.clone())?;
        let lookup = Lookup::new(
            config.name_finder_url.clone(),
            config.aadhaar_finder_url.clone(),
        );

        Ok(Self {
            config,
            ledger,
            admin,
            blocklist,
            activation,
            search_logs,
            lookup,
        })
    }
}
