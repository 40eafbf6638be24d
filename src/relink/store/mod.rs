//! # Storage Layer
//!
//! Durable record of relink operations and named path snapshots. The
//! [`DataStore`] trait is pure storage: no matching, no node access.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteStore`]: production store, one SQLite file with two tables
//!   ```text
//!   relink_history(id PK, timestamp default now, old_path_regex, new_path, use_regex, affected_nodes)
//!   saved_states(id PK, version UNIQUE, state (JSON object), timestamp default now)
//!   ```
//! - [`memory::InMemoryStore`]: in-memory store for tests, with write-error
//!   simulation.
//!
//! Every call is a single-row insert or lookup. The two tables share no
//! consistency requirement, so no multi-statement transactions are exposed.
//!
//! ## Versions
//!
//! A version label identifies exactly one snapshot. [`DataStore::save_state`]
//! refuses a label that already exists with
//! [`RelinkError::DuplicateVersion`](crate::error::RelinkError::DuplicateVersion);
//! [`DataStore::replace_state`] is the explicit overwrite.

use crate::error::Result;
use crate::model::{RelinkRecord, SavedStateInfo, StateMap};

pub mod memory;
pub mod sqlite;

pub trait DataStore {
    /// Append one history record and return its id.
    fn record_relink(
        &mut self,
        old_pattern: &str,
        new_path: &str,
        used_regex: bool,
        affected_count: usize,
    ) -> Result<i64>;

    /// All history records, oldest first.
    fn relink_history(&self) -> Result<Vec<RelinkRecord>>;

    /// Insert a new snapshot. Fails if `version` is already stored.
    fn save_state(&mut self, version: &str, state: &StateMap) -> Result<()>;

    /// Store a snapshot under `version`, discarding any previous one with that
    /// label. The replacement counts as the most recent snapshot.
    fn replace_state(&mut self, version: &str, state: &StateMap) -> Result<()>;

    /// Exact lookup. `Ok(None)` when the version was never saved.
    fn load_state(&self, version: &str) -> Result<Option<StateMap>>;

    /// Saved versions in insertion order.
    fn list_states(&self) -> Result<Vec<SavedStateInfo>>;

    /// Version of the most recently inserted snapshot.
    fn last_version(&self) -> Result<Option<String>>;

    fn state_exists(&self, version: &str) -> Result<bool>;
}
