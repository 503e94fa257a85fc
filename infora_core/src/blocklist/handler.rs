use sled::{Db, Tree};

use crate::blocklist::dto::BlockedNumber;
use crate::error::LedgerResult;

const BLOCKED_NUMBERS_TREE: &str = "blocked_numbers";

/// Set of blocked numbers, unique on the number string. Presence alone is
/// enough to deny a lookup; the check runs before any entitlement mutation
/// so a blocked search never costs anything.
#[derive(Clone)]
pub struct Blocklist {
    tree: Tree,
}

impl Blocklist {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(BLOCKED_NUMBERS_TREE)?;
        Ok(Self { tree })
    }

    pub fn is_blocked(&self, number: &str) -> LedgerResult<bool> {
        Ok(self.tree.contains_key(number.as_bytes())?)
    }

    /// Upsert; re-blocking an already-blocked number refreshes who blocked
    /// it and when rather than erroring.
    pub fn add(&self, number: &str, added_by: i64) -> LedgerResult<()> {
        let record = BlockedNumber {
            number: number.to_string(),
            added_by,
            added_at: chrono::Utc::now().timestamp(),
        };
        self.tree
            .insert(number.as_bytes(), serde_json::to_vec(&record)?)?;
        Ok(())
    }

    /// Returns false when the number was not blocked to begin with.
    pub fn remove(&self, number: &str) -> LedgerResult<bool> {
        Ok(self.tree.remove(number.as_bytes())?.is_some())
    }

    pub fn get(&self, number: &str) -> LedgerResult<Option<BlockedNumber>> {
        let raw = self.tree.get(number.as_bytes())?;
        Ok(raw.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_blocklist() -> (Blocklist, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        (Blocklist::new(&db).unwrap(), temp_dir)
    }

    #[test]
    fn test_block_unblock_round_trip() {
        let (blocklist, _temp) = create_test_blocklist();

        assert!(!blocklist.is_blocked("6295533968").unwrap());
        blocklist.add("6295533968", 777).unwrap();
        assert!(blocklist.is_blocked("6295533968").unwrap());
        assert!(blocklist.remove("6295533968").unwrap());
        assert!(!blocklist.is_blocked("6295533968").unwrap());
    }

    #[test]
    fn test_add_is_idempotent_and_refreshes_metadata() {
        let (blocklist, _temp) = create_test_blocklist();

        blocklist.add("6295533968", 1).unwrap();
        blocklist.add("6295533968", 2).unwrap();
        let record = blocklist.get("6295533968").unwrap().unwrap();
        assert_eq!(record.added_by, 2);
    }

    #[test]
    fn test_remove_missing_reports_absence() {
        let (blocklist, _temp) = create_test_blocklist();
        assert!(!blocklist.remove("000").unwrap());
    }
}
