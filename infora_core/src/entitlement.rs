//! Pure decision function for metered actions.

use crate::ledger::dto::{ChargeType, UserAccount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow { charge_type: ChargeType, cost: i64 },
    Deny(DenyReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    AccountSuspended,
    InsufficientFunds,
}

/// Decide how a metered action is paid for. Pure over the account snapshot;
/// the caller applies the matching mutation in the same atomic update that
/// re-evaluated the snapshot.
///
/// Bonus credits are consumed before the free trial so the trial counter the
/// user sees stays stable across promotions.
pub fn evaluate(account: &UserAccount, cost_per_action: i64, free_trial_limit: u32) -> Decision {
    if account.is_admin() {
        return Decision::Allow {
            charge_type: ChargeType::AdminExempt,
            cost: 0,
        };
    }
    if account.is_suspended {
        return Decision::Deny(DenyReason::AccountSuspended);
    }
    if account.bonus_count > 0 {
        return Decision::Allow {
            charge_type: ChargeType::Bonus,
            cost: 0,
        };
    }
    if account.trial_used_count < free_trial_limit {
        return Decision::Allow {
            charge_type: ChargeType::Trial,
            cost: 0,
        };
    }
    if account.balance >= cost_per_action {
        return Decision::Allow {
            charge_type: ChargeType::Paid,
            cost: cost_per_action,
        };
    }
    Decision::Deny(DenyReason::InsufficientFunds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::dto::Role;

    fn account(balance: i64, trial_used: u32, bonus: u32) -> UserAccount {
        UserAccount {
            balance,
            trial_used_count: trial_used,
            bonus_count: bonus,
            ..UserAccount::new(42, Role::User)
        }
    }

    #[test]
    fn test_admin_is_exempt_even_when_broke() {
        let mut acc = account(0, 99, 0);
        acc.role = Role::Admin;
        assert_eq!(
            evaluate(&acc, 2, 1),
            Decision::Allow {
                charge_type: ChargeType::AdminExempt,
                cost: 0
            }
        );
    }

    #[test]
    fn test_suspended_denied_regardless_of_balance() {
        let mut acc = account(1000, 0, 5);
        acc.is_suspended = true;
        assert_eq!(evaluate(&acc, 2, 1), Decision::Deny(DenyReason::AccountSuspended));
    }

    #[test]
    fn test_bonus_consumed_before_trial_and_balance() {
        // Trial slots and balance are both available, bonus still wins.
        let acc = account(100, 0, 3);
        assert_eq!(
            evaluate(&acc, 2, 1),
            Decision::Allow {
                charge_type: ChargeType::Bonus,
                cost: 0
            }
        );
    }

    #[test]
    fn test_trial_when_no_bonus() {
        let acc = account(100, 0, 0);
        assert_eq!(
            evaluate(&acc, 2, 1),
            Decision::Allow {
                charge_type: ChargeType::Trial,
                cost: 0
            }
        );
    }

    #[test]
    fn test_paid_when_trial_exhausted() {
        let acc = account(100, 1, 0);
        assert_eq!(
            evaluate(&acc, 2, 1),
            Decision::Allow {
                charge_type: ChargeType::Paid,
                cost: 2
            }
        );
    }

    #[test]
    fn test_balance_equal_to_cost_is_allowed() {
        let acc = account(2, 1, 0);
        assert_eq!(
            evaluate(&acc, 2, 1),
            Decision::Allow {
                charge_type: ChargeType::Paid,
                cost: 2
            }
        );
    }

    #[test]
    fn test_insufficient_funds_when_everything_exhausted() {
        let acc = account(1, 1, 0);
        assert_eq!(evaluate(&acc, 2, 1), Decision::Deny(DenyReason::InsufficientFunds));
    }
}
