use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationToken {
    pub token: String,
    pub owner_user_id: i64,
    pub credit_amount: u32,
    pub activated: bool,
    pub redeemed_by: Option<i64>,
    /// Unix seconds.
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedemptionResult {
    Success { credit_granted: u32 },
    AlreadyUsed,
    NotFoundOrExpired,
}
