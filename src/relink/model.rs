use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node full name → file path, as captured in a saved state.
pub type StateMap = BTreeMap<String, String>;

/// Read view of a host node that exposes a file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub full_name: String,
    pub path: String,
    pub selected: bool,
}

impl NodeRef {
    pub fn new(full_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            path: path.into(),
            selected: false,
        }
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// One row of the append-only relink log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinkRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub old_path_regex: String,
    pub new_path: String,
    pub use_regex: bool,
    pub affected_nodes: usize,
}

/// Listing entry for a saved state (the mapping itself is loaded on demand).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedStateInfo {
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub version: String,
    pub state: StateMap,
}

/// A path rewrite for one node, planned or applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathChange {
    pub full_name: String,
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFailure {
    pub full_name: String,
    pub reason: String,
}

/// Outcome of applying a batch of path writes. Each node is applied
/// independently; nothing is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<PathChange>,
    pub failures: Vec<NodeFailure>,
}

impl ApplyReport {
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failures.len()
    }

    pub fn affected(&self) -> usize {
        self.applied.len()
    }
}

/// A relink that was applied and logged to the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelinkOutcome {
    pub record_id: i64,
    pub report: ApplyReport,
}
