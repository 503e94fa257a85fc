use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use uuid::Uuid;

use crate::activation::dto::{ActivationToken, RedemptionResult};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;

const ACTIVATION_TOKENS_TREE: &str = "activation_tokens";

#[derive(Clone)]
pub struct Activation {
    tokens: Tree,
    ledger: Ledger,
}

impl Activation {
    pub fn new(db: &Db, ledger: Ledger) -> sled::Result<Self> {
        let tokens = db.open_tree(ACTIVATION_TOKENS_TREE)?;
        Ok(Self { tokens, ledger })
    }

    /// Mint a one-time token worth `credit_amount` bonus searches. The
    /// token string is a random v4 uuid, unguessable and unique.
    pub fn issue(
        &self,
        owner_user_id: i64,
        credit_amount: u32,
        ttl_secs: i64,
    ) -> LedgerResult<ActivationToken> {
        let now = chrono::Utc::now().timestamp();
        let record = ActivationToken {
            token: Uuid::new_v4().to_string(),
            owner_user_id,
            credit_amount,
            activated: false,
            redeemed_by: None,
            created_at: now,
            expires_at: now + ttl_secs,
        };
        self.tokens
            .insert(record.token.as_bytes(), serde_json::to_vec(&record)?)?;
        Ok(record)
    }

    /// Claim-once redemption. The activation-flag flip and the bonus grant
    /// commit together or not at all; of two concurrent attempts exactly one
    /// succeeds and the loser observes `AlreadyUsed`. A token past expiry is
    /// removed on sight and reported as absent.
    pub fn redeem(&self, token: &str, redeeming_user_id: i64) -> LedgerResult<RedemptionResult> {
        let now = chrono::Utc::now().timestamp();
        let accounts = self.ledger.accounts_tree();

        (&self.tokens, accounts)
            .transaction(
                |(tokens, accounts)| -> ConflictableTransactionResult<RedemptionResult, sled::Error> {
                    let raw = match tokens.get(token.as_bytes())? {
                        Some(raw) => raw,
                        None => return Ok(RedemptionResult::NotFoundOrExpired),
                    };
                    let mut record: ActivationToken = match serde_json::from_slice(&raw).ok() {
                        Some(record) => record,
                        None => return Ok(RedemptionResult::NotFoundOrExpired),
                    };
                    if now >= record.expires_at {
                        tokens.remove(token.as_bytes())?;
                        return Ok(RedemptionResult::NotFoundOrExpired);
                    }
                    if record.activated {
                        return Ok(RedemptionResult::AlreadyUsed);
                    }
                    record.activated = true;
                    record.redeemed_by = Some(redeeming_user_id);
                    tokens.insert(token.as_bytes(), serde_json::to_vec(&record).unwrap())?;

                    let key = Ledger::key(redeeming_user_id);
                    let mut account = self
                        .ledger
                        .decode_account(redeeming_user_id, accounts.get(&key)?.as_deref());
                    account.bonus_count += record.credit_amount;
                    accounts.insert(key.as_slice(), serde_json::to_vec(&account).unwrap())?;

                    Ok(RedemptionResult::Success {
                        credit_granted: record.credit_amount,
                    })
                },
            )
            .map_err(|err| match err {
                TransactionError::Storage(e) | TransactionError::Abort(e) => LedgerError::Store(e),
            })
    }

    pub fn get(&self, token: &str) -> LedgerResult<Option<ActivationToken>> {
        let raw = self.tokens.get(token.as_bytes())?;
        Ok(raw.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
    }

    /// Sweep tokens past expiry. A token past its TTL is dead whether or
    /// not it was redeemed; redemption treats it as absent either way.
    pub fn purge_expired(&self) -> LedgerResult<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut expired_keys = Vec::new();
        for kv in self.tokens.iter() {
            let (key, value) = kv?;
            if let Ok(record) = serde_json::from_slice::<ActivationToken>(&value) {
                if now >= record.expires_at {
                    expired_keys.push(key.to_vec());
                }
            }
        }
        let removed = expired_keys.len();
        for key in expired_keys {
            self.tokens.remove(key)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ADMIN_ID: i64 = 777;

    fn create_test_activation() -> (Activation, Ledger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        let ledger = Ledger::new(&db, ADMIN_ID).unwrap();
        let activation = Activation::new(&db, ledger.clone()).unwrap();
        (activation, ledger, temp_dir)
    }

    #[test]
    fn test_redeem_grants_bonus_once() {
        let (activation, ledger, _temp) = create_test_activation();
        let token = activation.issue(ADMIN_ID, 5, 3_600).unwrap();

        let first = activation.redeem(&token.token, 42).unwrap();
        assert_eq!(first, RedemptionResult::Success { credit_granted: 5 });
        assert_eq!(ledger.get_account(42).unwrap().unwrap().bonus_count, 5);

        let second = activation.redeem(&token.token, 42).unwrap();
        assert_eq!(second, RedemptionResult::AlreadyUsed);
        assert_eq!(ledger.get_account(42).unwrap().unwrap().bonus_count, 5);
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let (activation, _ledger, _temp) = create_test_activation();
        assert_eq!(
            activation.redeem("no-such-token", 42).unwrap(),
            RedemptionResult::NotFoundOrExpired
        );
    }

    #[test]
    fn test_expired_token_is_removed_and_reported_absent() {
        let (activation, ledger, _temp) = create_test_activation();
        let token = activation.issue(ADMIN_ID, 5, -1).unwrap();

        assert_eq!(
            activation.redeem(&token.token, 42).unwrap(),
            RedemptionResult::NotFoundOrExpired
        );
        assert!(activation.get(&token.token).unwrap().is_none());
        assert!(ledger.get_account(42).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_redemption_grants_exactly_once() {
        let (activation, ledger, _temp) = create_test_activation();
        let token = activation.issue(ADMIN_ID, 5, 3_600).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let activation = activation.clone();
                let token = token.token.clone();
                std::thread::spawn(move || activation.redeem(&token, 42).unwrap())
            })
            .collect();
        let results: Vec<RedemptionResult> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results
            .iter()
            .filter(|r| matches!(r, RedemptionResult::Success { .. }))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(ledger.get_account(42).unwrap().unwrap().bonus_count, 5);
    }

    #[test]
    fn test_purge_expired_sweeps_only_dead_tokens() {
        let (activation, _ledger, _temp) = create_test_activation();
        let live = activation.issue(ADMIN_ID, 1, 3_600).unwrap();
        activation.issue(ADMIN_ID, 1, -1).unwrap();
        activation.issue(ADMIN_ID, 1, -1).unwrap();

        assert_eq!(activation.purge_expired().unwrap(), 2);
        assert!(activation.get(&live.token).unwrap().is_some());
    }
}
