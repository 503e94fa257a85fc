use serde::{Deserialize, Serialize};

use crate::ledger::dto::UserAccount;
use crate::search_log::dto::SearchLogEntry;

/// The multi-step admin operations that wait for a follow-up text input.
/// Stored on the admin's account record while pending; `None` is idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminOperation {
    AddCredit,
    RemoveCredit,
    Suspend,
    Unban,
    StatusQuery,
    ViewLogs,
    AddBlock,
    RemoveBlock,
    AddBonus,
}

impl AdminOperation {
    /// Prompt shown when the operation is selected from the panel.
    pub fn format_hint(&self) -> &'static str {
        match self {
            AdminOperation::AddCredit => "ADD CREDIT MODE\nFormat: UserID Amount\nExample: 123456789 50",
            AdminOperation::RemoveCredit => "REMOVE CREDIT MODE\nFormat: UserID Amount\nExample: 123456789 20",
            AdminOperation::Suspend => "SUSPEND MODE\nFormat: UserID\nExample: 123456789",
            AdminOperation::Unban => "UNBAN MODE\nFormat: UserID\nExample: 123456789",
            AdminOperation::StatusQuery => "STATUS MODE\nFormat: UserID\nExample: 123456789",
            AdminOperation::ViewLogs => {
                "VIEW LOGS MODE\nFormat: number (how many recent logs)\nExample: 10"
            }
            AdminOperation::AddBlock => "ADD BLOCK MODE\nFormat: phone\nExample: 6295533968",
            AdminOperation::RemoveBlock => "REMOVE BLOCK MODE\nFormat: phone\nExample: 6295533968",
            AdminOperation::AddBonus => "ADD BONUS MODE\nFormat: UserID Amount\nExample: 123456789 3",
        }
    }

    /// The shape the follow-up input must have, for format-error replies.
    pub fn expected_format(&self) -> &'static str {
        match self {
            AdminOperation::AddCredit | AdminOperation::RemoveCredit | AdminOperation::AddBonus => {
                "UserID Amount"
            }
            AdminOperation::Suspend | AdminOperation::Unban | AdminOperation::StatusQuery => "UserID",
            AdminOperation::AddBlock | AdminOperation::RemoveBlock => "phone",
            AdminOperation::ViewLogs => "number",
        }
    }
}

/// Typed outcome of feeding one text input into the state machine. The
/// dispatch shell renders these; nothing here is a fault.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationResult {
    NotAdmin,
    NoPendingOperation,
    MalformedInput { expected: &'static str },
    BalanceAdjusted { target: i64, delta: i64, new_balance: i64 },
    BonusAdjusted { target: i64, delta: i64, new_bonus: u32 },
    SuspensionSet { target: i64, suspended: bool },
    Status { target: i64, account: Option<UserAccount> },
    Logs(Vec<SearchLogEntry>),
    NumberBlocked { number: String },
    NumberUnblocked { number: String, was_present: bool },
}
