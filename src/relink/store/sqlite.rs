use super::DataStore;
use crate::error::{RelinkError, Result};
use crate::model::{RelinkRecord, SavedStateInfo, StateMap};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_FILENAME: &str = "relink.db";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS relink_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    old_path_regex TEXT,
    new_path TEXT,
    use_regex INTEGER,
    affected_nodes INTEGER
);

CREATE TABLE IF NOT EXISTS saved_states (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version TEXT UNIQUE,
    state TEXT,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

// Format of SQLite's CURRENT_TIMESTAMP (always UTC).
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed store. One connection, statements run one at a time.
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(RelinkError::Io)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        log::debug!("Opened relink database at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| RelinkError::Store(format!("Invalid timestamp '{}': {}", raw, e)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl DataStore for SqliteStore {
    fn record_relink(
        &mut self,
        old_pattern: &str,
        new_path: &str,
        used_regex: bool,
        affected_count: usize,
    ) -> Result<i64> {
        let affected = i64::try_from(affected_count).map_err(|_| {
            RelinkError::Store(format!("affected count {} too large", affected_count))
        })?;
        self.conn.execute(
            "INSERT INTO relink_history (old_path_regex, new_path, use_regex, affected_nodes)
             VALUES (?1, ?2, ?3, ?4)",
            params![old_pattern, new_path, used_regex, affected],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn relink_history(&self) -> Result<Vec<RelinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, old_path_regex, new_path, use_regex, affected_nodes
             FROM relink_history
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<bool>>(4)?,
                row.get::<_, Option<i64>>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, timestamp, old_path_regex, new_path, use_regex, affected) = row?;
            records.push(RelinkRecord {
                id,
                timestamp: parse_timestamp(&timestamp)?,
                old_path_regex: old_path_regex.unwrap_or_default(),
                new_path: new_path.unwrap_or_default(),
                use_regex: use_regex.unwrap_or(false),
                affected_nodes: affected.unwrap_or(0).max(0) as usize,
            });
        }
        Ok(records)
    }

    fn save_state(&mut self, version: &str, state: &StateMap) -> Result<()> {
        let encoded = serde_json::to_string(state)?;
        self.conn
            .execute(
                "INSERT INTO saved_states (version, state) VALUES (?1, ?2)",
                params![version, encoded],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RelinkError::DuplicateVersion(version.to_string())
                } else {
                    RelinkError::Database(e)
                }
            })?;
        Ok(())
    }

    fn replace_state(&mut self, version: &str, state: &StateMap) -> Result<()> {
        let encoded = serde_json::to_string(state)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM saved_states WHERE version = ?1",
            params![version],
        )?;
        tx.execute(
            "INSERT INTO saved_states (version, state) VALUES (?1, ?2)",
            params![version, encoded],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_state(&self, version: &str) -> Result<Option<StateMap>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM saved_states WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn list_states(&self) -> Result<Vec<SavedStateInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, timestamp FROM saved_states ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut states = Vec::new();
        for row in rows {
            let (version, timestamp) = row?;
            states.push(SavedStateInfo {
                version,
                timestamp: parse_timestamp(&timestamp)?,
            });
        }
        Ok(states)
    }

    fn last_version(&self) -> Result<Option<String>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM saved_states ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    fn state_exists(&self, version: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM saved_states WHERE version = ?1",
            params![version],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
