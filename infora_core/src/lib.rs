pub mod activation;
pub mod admin;
pub mod blocklist;
pub mod cooldown;
pub mod entitlement;
pub mod error;
pub mod ledger;
pub mod search_log;
