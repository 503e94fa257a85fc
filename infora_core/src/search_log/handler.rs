use sled::{Db, Tree};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::search_log::dto::SearchLogEntry;

const SEARCH_LOGS_TREE: &str = "search_logs";

#[derive(Clone)]
pub struct SearchLogs {
    tree: Tree,
}

impl SearchLogs {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(SEARCH_LOGS_TREE)?;
        Ok(Self { tree })
    }

    pub fn append(&self, entry: &SearchLogEntry) -> LedgerResult<()> {
        self.tree
            .insert(Self::key_bytes(entry.timestamp), serde_json::to_vec(entry)?)?;
        Ok(())
    }

    /// The `count` most recent entries, newest first.
    pub fn recent(&self, count: usize) -> LedgerResult<Vec<SearchLogEntry>> {
        let mut out = Vec::new();
        for kv in self.tree.iter().rev() {
            let (_key, value) = kv?;
            if let Ok(entry) = serde_json::from_slice::<SearchLogEntry>(&value) {
                out.push(entry);
                if out.len() == count {
                    break;
                }
            }
        }
        Ok(out)
    }

    // Big-endian timestamp prefix keeps the tree in time order so a reverse
    // scan yields newest first; the uuid suffix keeps same-millisecond rows
    // distinct.
    fn key_bytes(timestamp: i64) -> Vec<u8> {
        let mut key = Vec::with_capacity(24);
        key.extend_from_slice(&timestamp.to_be_bytes());
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_logs() -> (SearchLogs, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        (SearchLogs::new(&db).unwrap(), temp_dir)
    }

    fn entry(user_id: i64, timestamp: i64) -> SearchLogEntry {
        SearchLogEntry {
            user_id,
            target: "6295533968".to_string(),
            timestamp,
            outcome_summary: "served".to_string(),
            cost_charged: 2,
            was_blocked: false,
        }
    }

    #[test]
    fn test_recent_returns_newest_first() {
        let (logs, _temp) = create_test_logs();
        for ts in [1_000, 3_000, 2_000] {
            logs.append(&entry(1, ts)).unwrap();
        }

        let recent = logs.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, 3_000);
        assert_eq!(recent[1].timestamp, 2_000);
    }

    #[test]
    fn test_same_millisecond_rows_are_kept() {
        let (logs, _temp) = create_test_logs();
        logs.append(&entry(1, 1_000)).unwrap();
        logs.append(&entry(2, 1_000)).unwrap();

        assert_eq!(logs.recent(10).unwrap().len(), 2);
    }
}
