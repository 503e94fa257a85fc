use serde::{Deserialize, Serialize};

/// One row per lookup attempt, written whether it was served, failed, or
/// short-circuited on the blocklist. Rows are never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub user_id: i64,
    pub target: String,
    /// Unix millis.
    pub timestamp: i64,
    pub outcome_summary: String,
    pub cost_charged: i64,
    pub was_blocked: bool,
}
