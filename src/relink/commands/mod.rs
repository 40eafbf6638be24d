//! # Command Layer
//!
//! The business logic of relink. Each command lives in its own submodule and is
//! a plain function over a [`DataStore`](crate::store::DataStore) and/or a
//! [`NodeAdapter`](crate::nodes::NodeAdapter).
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout or stderr. Outcomes are logged through the
//!   `log` facade and returned as data.
//! - **Argument parsing**: that's the CLI layer's job.
//! - **Saving the scene**: writes go through the adapter; persisting the host
//!   document is the caller's decision.
//!
//! ## Failure Policy
//!
//! - Bad input (empty or malformed pattern, empty version label, duplicate
//!   version) is rejected before any node is touched.
//! - A single node write that fails is recorded as a [`NodeFailure`] and the
//!   batch carries on. Nothing is rolled back.
//! - Store errors propagate. A relink whose history row cannot be written
//!   returns the error.
//!
//! ## Command Modules
//!
//! - [`nodes`]: enumerate and filter path nodes
//! - [`relink`]: pattern relink (preview and apply)
//! - [`redirect`]: configured directory redirect (preview and apply)
//! - [`snapshot`]: save, load, list and restore path snapshots
//! - [`history`]: the relink log
//! - [`helpers`]: shared apply/report utilities
//!
//! [`NodeFailure`]: crate::model::NodeFailure

use crate::model::{
    ApplyReport, NodeRef, PathChange, RelinkOutcome, RelinkRecord, SavedStateInfo, Snapshot,
};
use serde::Serialize;

pub mod helpers;
pub mod history;
pub mod nodes;
pub mod redirect;
pub mod relink;
pub mod snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub listed_nodes: Vec<NodeRef>,
    /// Changes a preview would make; nothing has been written.
    pub planned_changes: Vec<PathChange>,
    pub relink: Option<RelinkOutcome>,
    pub restored: Option<ApplyReport>,
    pub snapshot: Option<Snapshot>,
    pub saved_version: Option<String>,
    pub states: Vec<SavedStateInfo>,
    pub history: Vec<RelinkRecord>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_nodes(mut self, nodes: Vec<NodeRef>) -> Self {
        self.listed_nodes = nodes;
        self
    }

    pub fn with_planned_changes(mut self, changes: Vec<PathChange>) -> Self {
        self.planned_changes = changes;
        self
    }

    pub fn with_states(mut self, states: Vec<SavedStateInfo>) -> Self {
        self.states = states;
        self
    }

    pub fn with_history(mut self, history: Vec<RelinkRecord>) -> Self {
        self.history = history;
        self
    }

    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Number of nodes written by a relink or restore, if one ran.
    pub fn affected_count(&self) -> usize {
        let relinked = self.relink.as_ref().map_or(0, |r| r.report.affected());
        let restored = self.restored.as_ref().map_or(0, |r| r.affected());
        relinked + restored
    }
}
