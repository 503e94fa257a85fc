use serde::{Deserialize, Serialize};

use crate::admin::dto::AdminOperation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

/// One account per platform user, created lazily on first contact and never
/// deleted (suspension is the soft-delete).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: i64,
    pub balance: i64,
    pub trial_used_count: u32,
    pub bonus_count: u32,
    pub is_suspended: bool,
    pub role: Role,
    /// Unix millis of the last successfully initiated metered action.
    pub last_action_ts: i64,
    pub admin_pending_operation: Option<AdminOperation>,
}

impl UserAccount {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id,
            balance: 0,
            trial_used_count: 0,
            bonus_count: 0,
            is_suspended: false,
            role,
            last_action_ts: 0,
            admin_pending_operation: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn free_searches_left(&self, free_trial_limit: u32) -> u32 {
        free_trial_limit.saturating_sub(self.trial_used_count)
    }
}

/// Which entitlement a metered action consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    AdminExempt,
    Bonus,
    Trial,
    Paid,
}

/// Receipt for a charge that was applied, snapshotted from the same atomic
/// update that applied it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedCharge {
    pub charge_type: ChargeType,
    pub cost: i64,
    pub balance: i64,
    pub free_searches_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChargeOutcome {
    Allowed(AppliedCharge),
    AccountSuspended,
    InsufficientFunds,
    CooldownActive { remaining_ms: i64 },
}
