use tracing::debug;

use crate::domain::DownloadLedger;
use crate::errors::{SaugError, SaugResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::LedgerStore;

pub struct SqliteLedgerStore {
    storage: SqliteStorage,
}

impl SqliteLedgerStore {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&self) -> SaugResult<DownloadLedger> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT source, identity FROM downloads ORDER BY source, position",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut ledger = DownloadLedger::new();
        for row in rows {
            let (source, identity) = row?;
            ledger.record(&source, &identity);
        }

        debug!("Loaded {} recorded downloads", ledger.total());
        Ok(ledger)
    }

    fn save(&self, ledger: &DownloadLedger) -> SaugResult<()> {
        let mut conn = self.storage.connection()?;

        // One transaction: either the whole new ledger lands or the old one stays.
        let tx = conn
            .transaction()
            .map_err(|e| SaugError::LedgerSave(e.to_string()))?;

        // Existing rows keep their recorded_at; only the position may move.
        let write = |tx: &rusqlite::Transaction<'_>| -> rusqlite::Result<()> {
            let mut upsert = tx.prepare(
                "INSERT INTO downloads (source, position, identity) VALUES (?1, ?2, ?3)
                 ON CONFLICT(source, identity) DO UPDATE SET position = excluded.position",
            )?;
            for (source, identities) in ledger.sources() {
                for (position, identity) in identities.iter().enumerate() {
                    upsert.execute((source, position as i64, identity))?;
                }
            }

            let stale: Vec<(String, String)> = {
                let mut stmt = tx.prepare("SELECT source, identity FROM downloads")?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect::<rusqlite::Result<Vec<(String, String)>>>()?
                    .into_iter()
                    .filter(|(source, identity)| !ledger.contains(source, identity))
                    .collect()
            };

            let mut delete =
                tx.prepare("DELETE FROM downloads WHERE source = ?1 AND identity = ?2")?;
            for (source, identity) in &stale {
                delete.execute((source, identity))?;
            }
            Ok(())
        };

        write(&tx).map_err(|e| SaugError::LedgerSave(e.to_string()))?;
        tx.commit()
            .map_err(|e| SaugError::LedgerSave(e.to_string()))?;

        debug!("Saved {} recorded downloads", ledger.total());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> SqliteLedgerStore {
        let storage = SqliteStorage::in_memory().unwrap();
        SqliteLedgerStore::new(storage)
    }

    #[test]
    fn test_load_empty() {
        let store = setup_store();
        let ledger = store.load().unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_save_and_load_keeps_order() {
        let store = setup_store();
        let mut ledger = DownloadLedger::new();
        ledger.record("https://example.com/feed", "zeta");
        ledger.record("https://example.com/feed", "alpha");
        ledger.record("https://example.com/feed", "mid");
        ledger.record("https://other.org/rss", "abc");

        store.save(&ledger).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.slice("https://example.com/feed"), &["zeta", "alpha", "mid"]);
        assert_eq!(loaded.slice("https://other.org/rss"), &["abc"]);
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let store = setup_store();

        let mut first = DownloadLedger::new();
        first.record("S1", "old");
        store.save(&first).unwrap();

        let mut second = DownloadLedger::new();
        second.record("S2", "new");
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.slice("S1").is_empty());
        assert_eq!(loaded.slice("S2"), &["new"]);
    }

    fn recorded_at(storage: &SqliteStorage, identity: &str) -> String {
        let conn = storage.connection().unwrap();
        conn.query_row(
            "SELECT recorded_at FROM downloads WHERE identity = ?1",
            [identity],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_resave_keeps_recorded_at() {
        let storage = SqliteStorage::in_memory().unwrap();
        let store = SqliteLedgerStore::new(storage.clone());

        let mut ledger = DownloadLedger::new();
        ledger.record("S", "old");
        store.save(&ledger).unwrap();
        storage
            .connection()
            .unwrap()
            .execute(
                "UPDATE downloads SET recorded_at = '2020-01-01 00:00:00' WHERE identity = 'old'",
                [],
            )
            .unwrap();

        let mut ledger = store.load().unwrap();
        ledger.record("S", "new");
        store.save(&ledger).unwrap();

        assert_eq!(recorded_at(&storage, "old"), "2020-01-01 00:00:00");
        assert_ne!(recorded_at(&storage, "new"), "2020-01-01 00:00:00");
        assert_eq!(store.load().unwrap().slice("S"), &["old", "new"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        let mut ledger = DownloadLedger::new();
        ledger.record("S", "abc");
        SqliteLedgerStore::new(SqliteStorage::new(&path).unwrap())
            .save(&ledger)
            .unwrap();

        let reopened = SqliteLedgerStore::new(SqliteStorage::new(&path).unwrap());
        assert_eq!(reopened.load().unwrap().slice("S"), &["abc"]);
    }
}
