use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::{SaugError, SaugResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS downloads (
    source TEXT NOT NULL,
    position INTEGER NOT NULL,
    identity TEXT NOT NULL,
    recorded_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (source, identity)
);

CREATE INDEX IF NOT EXISTS idx_downloads_source_position ON downloads(source, position);
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the ledger database. A missing file is an empty ledger.
    pub fn new<P: AsRef<Path>>(path: P) -> SaugResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> SaugResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SaugError> {
        self.conn
            .lock()
            .map_err(|_| SaugError::Database(rusqlite::Error::InvalidQuery))
    }
}
