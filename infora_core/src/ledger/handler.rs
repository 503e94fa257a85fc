use sled::{Db, Tree};

use crate::admin::dto::AdminOperation;
use crate::cooldown::{check_cooldown, CooldownStatus};
use crate::entitlement::{evaluate, Decision, DenyReason};
use crate::error::LedgerResult;
use crate::ledger::dto::{AppliedCharge, ChargeOutcome, ChargeType, Role, UserAccount};

const ACCOUNTS_TREE: &str = "accounts";

/// Owner of all `UserAccount` mutation. Every write is a single atomic store
/// operation (a CAS loop under `update_and_fetch`), so concurrent updates for
/// the same user serialize at the tree without an explicit lock.
#[derive(Clone)]
pub struct Ledger {
    accounts: Tree,
    admin_user_id: i64,
}

impl Ledger {
    /// `admin_user_id` is the one distinguished admin identity, fixed for
    /// the process lifetime.
    pub fn new(db: &Db, admin_user_id: i64) -> sled::Result<Self> {
        let accounts = db.open_tree(ACCOUNTS_TREE)?;
        Ok(Self {
            accounts,
            admin_user_id,
        })
    }

    pub fn is_configured_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_user_id
    }

    pub(crate) fn accounts_tree(&self) -> &Tree {
        &self.accounts
    }

    pub(crate) fn key(user_id: i64) -> Vec<u8> {
        user_id.to_be_bytes().to_vec()
    }

    pub(crate) fn decode_account(&self, user_id: i64, raw: Option<&[u8]>) -> UserAccount {
        let role = if self.is_configured_admin(user_id) {
            Role::Admin
        } else {
            Role::User
        };
        raw.and_then(|bytes| serde_json::from_slice(bytes).ok())
            .unwrap_or_else(|| UserAccount::new(user_id, role))
    }

    fn mutate<F>(&self, user_id: i64, mut apply: F) -> LedgerResult<UserAccount>
    where
        F: FnMut(&mut UserAccount),
    {
        let raw = self.accounts.update_and_fetch(Self::key(user_id), |old| {
            let mut account = self.decode_account(user_id, old);
            apply(&mut account);
            Some(serde_json::to_vec(&account).unwrap())
        })?;
        Ok(self.decode_account(user_id, raw.as_deref()))
    }

    /// Fetch the account, creating it with default zero/false values on
    /// first contact.
    pub fn get_or_create(&self, user_id: i64) -> LedgerResult<UserAccount> {
        self.mutate(user_id, |_| {})
    }

    pub fn get_account(&self, user_id: i64) -> LedgerResult<Option<UserAccount>> {
        let raw = self.accounts.get(Self::key(user_id))?;
        Ok(raw.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
    }

    /// Cooldown check, entitlement decision, and the matching mutation in
    /// one atomic update. The closure re-runs on contention with the fresh
    /// record, so two concurrent charges cannot both take the last
    /// trial/bonus slot. A cooldown denial leaves the record untouched;
    /// `last_action_ts` advances only when the charge applies.
    pub fn evaluate_and_charge(
        &self,
        user_id: i64,
        cost_per_action: i64,
        free_trial_limit: u32,
        cooldown_ms: i64,
        now: i64,
    ) -> LedgerResult<ChargeOutcome> {
        let mut outcome = ChargeOutcome::InsufficientFunds;
        self.accounts.update_and_fetch(Self::key(user_id), |old| {
            let mut account = self.decode_account(user_id, old);
            if let CooldownStatus::Denied { remaining_ms } =
                check_cooldown(account.last_action_ts, now, cooldown_ms, account.is_admin())
            {
                outcome = ChargeOutcome::CooldownActive { remaining_ms };
                return Some(serde_json::to_vec(&account).unwrap());
            }
            match evaluate(&account, cost_per_action, free_trial_limit) {
                Decision::Allow { charge_type, cost } => {
                    match charge_type {
                        ChargeType::Bonus => account.bonus_count -= 1,
                        ChargeType::Trial => account.trial_used_count += 1,
                        ChargeType::Paid => account.balance -= cost,
                        ChargeType::AdminExempt => {}
                    }
                    account.last_action_ts = now;
                    outcome = ChargeOutcome::Allowed(AppliedCharge {
                        charge_type,
                        cost,
                        balance: account.balance,
                        free_searches_left: account.free_searches_left(free_trial_limit),
                    });
                }
                Decision::Deny(DenyReason::AccountSuspended) => {
                    outcome = ChargeOutcome::AccountSuspended;
                }
                Decision::Deny(DenyReason::InsufficientFunds) => {
                    outcome = ChargeOutcome::InsufficientFunds;
                }
            }
            Some(serde_json::to_vec(&account).unwrap())
        })?;
        Ok(outcome)
    }

    /// Compensating reversal after a downstream failure: the same atomic
    /// shape as the charge, in the opposite direction. Best effort; the
    /// caller logs a failed reversal for reconciliation instead of retrying.
    pub fn reverse_charge(&self, user_id: i64, charge_type: ChargeType, cost: i64) -> LedgerResult<()> {
        self.mutate(user_id, |account| match charge_type {
            ChargeType::Bonus => account.bonus_count += 1,
            ChargeType::Trial => {
                account.trial_used_count = account.trial_used_count.saturating_sub(1)
            }
            ChargeType::Paid => account.balance += cost,
            ChargeType::AdminExempt => {}
        })
        .map(|_| ())
    }

    /// Admin override; may drive the balance to any integer.
    pub fn adjust_balance(&self, user_id: i64, delta: i64) -> LedgerResult<UserAccount> {
        self.mutate(user_id, |account| account.balance += delta)
    }

    pub fn adjust_bonus(&self, user_id: i64, delta: i64) -> LedgerResult<UserAccount> {
        self.mutate(user_id, |account| {
            account.bonus_count = if delta >= 0 {
                account.bonus_count.saturating_add(delta as u32)
            } else {
                account.bonus_count.saturating_sub((-delta) as u32)
            }
        })
    }

    pub fn set_suspended(&self, user_id: i64, suspended: bool) -> LedgerResult<UserAccount> {
        self.mutate(user_id, |account| account.is_suspended = suspended)
    }

    pub fn pending_operation(&self, user_id: i64) -> LedgerResult<Option<AdminOperation>> {
        Ok(self
            .get_account(user_id)?
            .and_then(|account| account.admin_pending_operation))
    }

    pub fn set_pending_operation(
        &self,
        user_id: i64,
        op: Option<AdminOperation>,
    ) -> LedgerResult<()> {
        self.mutate(user_id, |account| account.admin_pending_operation = op)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ADMIN_ID: i64 = 777;

    fn create_test_ledger() -> (Ledger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        let ledger = Ledger::new(&db, ADMIN_ID).unwrap();
        (ledger, temp_dir)
    }

    #[test]
    fn test_lazy_creation_with_defaults() {
        let (ledger, _temp) = create_test_ledger();

        let account = ledger.get_or_create(42).unwrap();
        assert_eq!(account.user_id, 42);
        assert_eq!(account.balance, 0);
        assert_eq!(account.trial_used_count, 0);
        assert_eq!(account.bonus_count, 0);
        assert!(!account.is_suspended);
        assert_eq!(account.role, Role::User);

        let admin = ledger.get_or_create(ADMIN_ID).unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn test_trial_then_insufficient_funds() {
        // Fresh account, one free search, cost 2: first call rides the
        // trial, second call is denied.
        let (ledger, _temp) = create_test_ledger();

        let first = ledger.evaluate_and_charge(42, 2, 1, 0, 1_000).unwrap();
        match first {
            ChargeOutcome::Allowed(charge) => {
                assert_eq!(charge.charge_type, ChargeType::Trial);
                assert_eq!(charge.cost, 0);
                assert_eq!(charge.free_searches_left, 0);
            }
            other => panic!("expected trial charge, got {:?}", other),
        }
        assert_eq!(ledger.get_account(42).unwrap().unwrap().trial_used_count, 1);

        let second = ledger.evaluate_and_charge(42, 2, 1, 0, 2_000).unwrap();
        assert_eq!(second, ChargeOutcome::InsufficientFunds);
    }

    #[test]
    fn test_paid_charge_moves_balance_and_timestamp() {
        let (ledger, _temp) = create_test_ledger();
        ledger.adjust_balance(42, 5).unwrap();
        ledger.evaluate_and_charge(42, 2, 0, 0, 1_000).unwrap();

        let account = ledger.get_account(42).unwrap().unwrap();
        assert_eq!(account.balance, 3);
        assert_eq!(account.last_action_ts, 1_000);
    }

    #[test]
    fn test_cooldown_denial_consumes_nothing() {
        let (ledger, _temp) = create_test_ledger();
        ledger.adjust_bonus(42, 1).unwrap();

        let first = ledger.evaluate_and_charge(42, 2, 1, 2_000, 10_000).unwrap();
        assert!(matches!(first, ChargeOutcome::Allowed(_)));

        let second = ledger.evaluate_and_charge(42, 2, 1, 2_000, 10_500).unwrap();
        assert_eq!(second, ChargeOutcome::CooldownActive { remaining_ms: 1_500 });

        // Neither the remaining entitlements nor the timestamp moved.
        let account = ledger.get_account(42).unwrap().unwrap();
        assert_eq!(account.bonus_count, 0);
        assert_eq!(account.trial_used_count, 0);
        assert_eq!(account.last_action_ts, 10_000);
    }

    #[test]
    fn test_suspended_account_is_denied() {
        let (ledger, _temp) = create_test_ledger();
        ledger.adjust_balance(42, 100).unwrap();
        ledger.set_suspended(42, true).unwrap();

        let outcome = ledger.evaluate_and_charge(42, 2, 1, 0, 1_000).unwrap();
        assert_eq!(outcome, ChargeOutcome::AccountSuspended);

        ledger.set_suspended(42, false).unwrap();
        let outcome = ledger.evaluate_and_charge(42, 2, 0, 0, 2_000).unwrap();
        assert!(matches!(outcome, ChargeOutcome::Allowed(_)));
    }

    #[test]
    fn test_trial_reversal_restores_exact_count() {
        let (ledger, _temp) = create_test_ledger();

        let outcome = ledger.evaluate_and_charge(42, 2, 1, 0, 1_000).unwrap();
        let charge = match outcome {
            ChargeOutcome::Allowed(charge) => charge,
            other => panic!("expected charge, got {:?}", other),
        };
        assert_eq!(ledger.get_account(42).unwrap().unwrap().trial_used_count, 1);

        ledger.reverse_charge(42, charge.charge_type, charge.cost).unwrap();
        assert_eq!(ledger.get_account(42).unwrap().unwrap().trial_used_count, 0);
    }

    #[test]
    fn test_paid_reversal_refunds_balance() {
        let (ledger, _temp) = create_test_ledger();
        ledger.adjust_balance(42, 2).unwrap();

        ledger.evaluate_and_charge(42, 2, 0, 0, 1_000).unwrap();
        assert_eq!(ledger.get_account(42).unwrap().unwrap().balance, 0);

        ledger.reverse_charge(42, ChargeType::Paid, 2).unwrap();
        assert_eq!(ledger.get_account(42).unwrap().unwrap().balance, 2);
    }

    #[test]
    fn test_concurrent_charges_take_single_trial_slot() {
        // Two threads race for one remaining free search; exactly one may
        // win it, the other must be denied.
        let (ledger, _temp) = create_test_ledger();

        let handles: Vec<_> = (0..2i64)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger
                        .evaluate_and_charge(42, 2, 1, 0, 1_000 + i)
                        .unwrap()
                })
            })
            .collect();
        let outcomes: Vec<ChargeOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let allowed = outcomes
            .iter()
            .filter(|o| matches!(o, ChargeOutcome::Allowed(_)))
            .count();
        assert_eq!(allowed, 1);
        assert_eq!(ledger.get_account(42).unwrap().unwrap().trial_used_count, 1);
    }

    #[test]
    fn test_adjust_bonus_saturates_at_zero() {
        let (ledger, _temp) = create_test_ledger();
        ledger.adjust_bonus(42, 3).unwrap();
        let account = ledger.adjust_bonus(42, -10).unwrap();
        assert_eq!(account.bonus_count, 0);
    }
}
