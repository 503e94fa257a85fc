use crate::admin::dto::{AdminOperation, OperationResult};
use crate::blocklist::Blocklist;
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::search_log::SearchLogs;

const DEFAULT_LOG_COUNT: usize = 10;
const MAX_LOG_COUNT: usize = 100;

#[derive(Clone)]
pub struct Admin {
    ledger: Ledger,
    blocklist: Blocklist,
    logs: SearchLogs,
}

impl Admin {
    pub fn new(ledger: Ledger, blocklist: Blocklist, logs: SearchLogs) -> Self {
        Self {
            ledger,
            blocklist,
            logs,
        }
    }

    /// Arm the state machine: the admin's next freeform text will be parsed
    /// as `op`'s input. Returns false (and stores nothing) for anyone but
    /// the configured admin.
    pub fn begin(&self, admin_id: i64, op: AdminOperation) -> LedgerResult<bool> {
        if !self.ledger.is_configured_admin(admin_id) {
            return Ok(false);
        }
        self.ledger.set_pending_operation(admin_id, Some(op))?;
        Ok(true)
    }

    /// Feed the next text input into the pending operation. The pending
    /// state is cleared before the input is applied, malformed or not, so
    /// an admin is never stuck: a typo just means re-opening the panel.
    pub fn consume(&self, admin_id: i64, raw_text: &str) -> LedgerResult<OperationResult> {
        if !self.ledger.is_configured_admin(admin_id) {
            return Ok(OperationResult::NotAdmin);
        }
        let op = match self.ledger.pending_operation(admin_id)? {
            Some(op) => op,
            None => return Ok(OperationResult::NoPendingOperation),
        };
        self.ledger.set_pending_operation(admin_id, None)?;

        let parts: Vec<&str> = raw_text.split_whitespace().collect();
        let malformed = OperationResult::MalformedInput {
            expected: op.expected_format(),
        };

        match op {
            AdminOperation::AddCredit | AdminOperation::RemoveCredit => {
                if parts.len() != 2 {
                    return Ok(malformed);
                }
                let target = match parse_user_id(parts[0]) {
                    Some(id) => id,
                    None => return Ok(malformed),
                };
                let amount: i64 = match parts[1].parse() {
                    Ok(amount) => amount,
                    Err(_) => return Ok(malformed),
                };
                let delta = if op == AdminOperation::AddCredit {
                    amount
                } else {
                    -amount
                };
                let account = self.ledger.adjust_balance(target, delta)?;
                Ok(OperationResult::BalanceAdjusted {
                    target,
                    delta,
                    new_balance: account.balance,
                })
            }
            AdminOperation::AddBonus => {
                if parts.len() != 2 {
                    return Ok(malformed);
                }
                let target = match parse_user_id(parts[0]) {
                    Some(id) => id,
                    None => return Ok(malformed),
                };
                let delta: i64 = match parts[1].parse() {
                    Ok(delta) => delta,
                    Err(_) => return Ok(malformed),
                };
                let account = self.ledger.adjust_bonus(target, delta)?;
                Ok(OperationResult::BonusAdjusted {
                    target,
                    delta,
                    new_bonus: account.bonus_count,
                })
            }
            AdminOperation::Suspend | AdminOperation::Unban => {
                if parts.len() != 1 {
                    return Ok(malformed);
                }
                let target = match parse_user_id(parts[0]) {
                    Some(id) => id,
                    None => return Ok(malformed),
                };
                let suspended = op == AdminOperation::Suspend;
                self.ledger.set_suspended(target, suspended)?;
                Ok(OperationResult::SuspensionSet { target, suspended })
            }
            AdminOperation::StatusQuery => {
                if parts.len() != 1 {
                    return Ok(malformed);
                }
                let target = match parse_user_id(parts[0]) {
                    Some(id) => id,
                    None => return Ok(malformed),
                };
                let account = self.ledger.get_account(target)?;
                Ok(OperationResult::Status { target, account })
            }
            AdminOperation::ViewLogs => {
                let count = match parts.len() {
                    0 => DEFAULT_LOG_COUNT,
                    1 => parts[0]
                        .parse::<usize>()
                        .map(|n| n.clamp(1, MAX_LOG_COUNT))
                        .unwrap_or(DEFAULT_LOG_COUNT),
                    _ => return Ok(malformed),
                };
                Ok(OperationResult::Logs(self.logs.recent(count)?))
            }
            AdminOperation::AddBlock => {
                if parts.len() != 1 {
                    return Ok(malformed);
                }
                let number = parts[0].to_string();
                self.blocklist.add(&number, admin_id)?;
                Ok(OperationResult::NumberBlocked { number })
            }
            AdminOperation::RemoveBlock => {
                if parts.len() != 1 {
                    return Ok(malformed);
                }
                let number = parts[0].to_string();
                let was_present = self.blocklist.remove(&number)?;
                Ok(OperationResult::NumberUnblocked { number, was_present })
            }
        }
    }
}

fn parse_user_id(token: &str) -> Option<i64> {
    token.parse::<i64>().ok().filter(|id| *id > 0)
}
