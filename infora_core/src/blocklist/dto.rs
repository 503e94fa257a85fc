use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockedNumber {
    pub number: String,
    pub added_by: i64,
    /// Unix seconds.
    pub added_at: i64,
}
