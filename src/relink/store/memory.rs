use super::DataStore;
use crate::error::{RelinkError, Result};
use crate::model::{RelinkRecord, SavedStateInfo, StateMap};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
struct StateRow {
    id: i64,
    version: String,
    state: StateMap,
    timestamp: DateTime<Utc>,
}

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    history: Vec<RelinkRecord>,
    states: Vec<StateRow>,
    next_history_id: i64,
    next_state_id: i64,
    simulate_write_error: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for testing error propagation.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error {
            return Err(RelinkError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn insert_state(&mut self, version: &str, state: &StateMap) {
        self.next_state_id += 1;
        self.states.push(StateRow {
            id: self.next_state_id,
            version: version.to_string(),
            state: state.clone(),
            timestamp: Utc::now(),
        });
    }
}

impl DataStore for InMemoryStore {
    fn record_relink(
        &mut self,
        old_pattern: &str,
        new_path: &str,
        used_regex: bool,
        affected_count: usize,
    ) -> Result<i64> {
        self.check_writable()?;
        self.next_history_id += 1;
        self.history.push(RelinkRecord {
            id: self.next_history_id,
            timestamp: Utc::now(),
            old_path_regex: old_pattern.to_string(),
            new_path: new_path.to_string(),
            use_regex: used_regex,
            affected_nodes: affected_count,
        });
        Ok(self.next_history_id)
    }

    fn relink_history(&self) -> Result<Vec<RelinkRecord>> {
        Ok(self.history.clone())
    }

    fn save_state(&mut self, version: &str, state: &StateMap) -> Result<()> {
        self.check_writable()?;
        if self.states.iter().any(|row| row.version == version) {
            return Err(RelinkError::DuplicateVersion(version.to_string()));
        }
        self.insert_state(version, state);
        Ok(())
    }

    fn replace_state(&mut self, version: &str, state: &StateMap) -> Result<()> {
        self.check_writable()?;
        self.states.retain(|row| row.version != version);
        self.insert_state(version, state);
        Ok(())
    }

    fn load_state(&self, version: &str) -> Result<Option<StateMap>> {
        Ok(self
            .states
            .iter()
            .find(|row| row.version == version)
            .map(|row| row.state.clone()))
    }

    fn list_states(&self) -> Result<Vec<SavedStateInfo>> {
        Ok(self
            .states
            .iter()
            .map(|row| SavedStateInfo {
                version: row.version.clone(),
                timestamp: row.timestamp,
            })
            .collect())
    }

    fn last_version(&self) -> Result<Option<String>> {
        Ok(self
            .states
            .iter()
            .max_by_key(|row| row.id)
            .map(|row| row.version.clone()))
    }

    fn state_exists(&self, version: &str) -> Result<bool> {
        Ok(self.states.iter().any(|row| row.version == version))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_state(mut self, version: &str, pairs: &[(&str, &str)]) -> Self {
            let state: StateMap = pairs
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_string()))
                .collect();
            self.store.save_state(version, &state).unwrap();
            self
        }

        pub fn with_versions(mut self, versions: &[&str]) -> Self {
            for version in versions {
                self.store.save_state(version, &StateMap::new()).unwrap();
            }
            self
        }
    }
}
