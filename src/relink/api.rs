//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for relink operations, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the store, the node adapter and the resolved [`RelinkConfig`]
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (version kinds to labels, selection to node names)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout or stderr
//! - **Saving the scene**: the caller decides when and where to write it
//!
//! ## Generic Over DataStore and NodeAdapter
//!
//! - Production: `RelinkApi<SqliteStore, NukeScript>`
//! - Testing: `RelinkApi<InMemoryStore, InMemoryNodes>`
//!
//! API tests verify dispatch and argument handling, not command logic.

use crate::commands;
use crate::config::RelinkConfig;
use crate::error::Result;
use crate::model::{ApplyReport, NodeRef, StateMap};
use crate::nodes::NodeAdapter;
use crate::pattern::PathPattern;
use crate::store::DataStore;
use crate::version::{self, VersionKind};

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};

pub struct RelinkApi<S: DataStore, N: NodeAdapter> {
    store: S,
    nodes: N,
    config: RelinkConfig,
}

impl<S: DataStore, N: NodeAdapter> RelinkApi<S, N> {
    pub fn new(store: S, nodes: N, config: RelinkConfig) -> Self {
        Self {
            store,
            nodes,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn nodes(&self) -> &N {
        &self.nodes
    }

    pub fn into_nodes(self) -> N {
        self.nodes
    }

    pub fn enumerate_nodes(&self) -> Result<Vec<NodeRef>> {
        self.nodes.list_path_nodes()
    }

    pub fn list_nodes(&self, selected_only: bool) -> Result<CmdResult> {
        commands::nodes::list(&self.nodes, selected_only)
    }

    pub fn find_nodes_with_paths(&self, pattern: &str, use_regex: bool) -> Result<CmdResult> {
        commands::nodes::find(&self.nodes, pattern, use_regex)
    }

    /// Apply the configured rewrite rule to `node` without touching it.
    ///
    /// With no `new_directory` configured the path comes back unchanged.
    pub fn compute_new_path(&self, node: &NodeRef) -> String {
        let rule = self.config.rewrite_rule();
        if rule.is_unset() {
            log::warn!("No redirect configured, {} keeps its path", node.full_name);
        }
        rule.apply(&node.path)
    }

    pub fn preview_relink(
        &self,
        old_pattern: &str,
        new_path: &str,
        use_regex: bool,
    ) -> Result<CmdResult> {
        commands::relink::preview(&self.nodes, old_pattern, new_path, use_regex)
    }

    pub fn perform_relink(
        &mut self,
        old_pattern: &str,
        new_path: &str,
        use_regex: bool,
    ) -> Result<CmdResult> {
        commands::relink::run(
            &mut self.store,
            &mut self.nodes,
            old_pattern,
            new_path,
            use_regex,
        )
    }

    pub fn preview_redirect(&self, selected_only: bool) -> Result<CmdResult> {
        commands::redirect::preview(&self.nodes, &self.config, selected_only)
    }

    pub fn execute_replacement(&mut self, selected_only: bool) -> Result<CmdResult> {
        commands::redirect::run(
            &mut self.store,
            &mut self.nodes,
            &self.config,
            selected_only,
        )
    }

    pub fn generate_version(&self, kind: &VersionKind) -> Result<String> {
        version::generate(&self.store, kind)
    }

    pub fn save_state<I: AsRef<str>>(
        &mut self,
        version: &str,
        node_names: &[I],
        overwrite: bool,
    ) -> Result<CmdResult> {
        let names: Vec<String> = node_names.iter().map(|n| n.as_ref().to_string()).collect();
        commands::snapshot::save(&mut self.store, &self.nodes, version, &names, overwrite)
    }

    /// Save under a label produced by `kind`.
    ///
    /// A user label with `overwrite` set may name an existing state; generated
    /// labels are always fresh.
    pub fn save_state_as<I: AsRef<str>>(
        &mut self,
        kind: &VersionKind,
        node_names: &[I],
        overwrite: bool,
    ) -> Result<CmdResult> {
        let version = match kind {
            VersionKind::UserInput(label) if overwrite => label.trim().to_string(),
            _ => self.generate_version(kind)?,
        };
        self.save_state(&version, node_names, overwrite)
    }

    /// Snapshot the selected path nodes, or every path node when
    /// `selected_only` is false.
    pub fn save_selected_state(
        &mut self,
        kind: &VersionKind,
        selected_only: bool,
        overwrite: bool,
    ) -> Result<CmdResult> {
        let names: Vec<String> = commands::helpers::candidate_nodes(&self.nodes, selected_only)?
            .into_iter()
            .map(|node| node.full_name)
            .collect();
        self.save_state_as(kind, &names, overwrite)
    }

    pub fn load_state(&self, version: &str) -> Result<CmdResult> {
        commands::snapshot::load(&self.store, version)
    }

    pub fn execute_snapshot_restore(&mut self, state: &StateMap) -> Result<ApplyReport> {
        commands::snapshot::execute_restore(&mut self.nodes, state)
    }

    pub fn restore_state(&mut self, version: &str) -> Result<CmdResult> {
        commands::snapshot::restore(&self.store, &mut self.nodes, version)
    }

    pub fn list_states(&self) -> Result<CmdResult> {
        commands::snapshot::list(&self.store)
    }

    pub fn relink_history(&self) -> Result<CmdResult> {
        commands::history::run(&self.store)
    }

    /// Whether `path` would be picked up by a relink with `pattern`.
    pub fn matches(&self, path: &str, pattern: &str, use_regex: bool) -> Result<bool> {
        Ok(PathPattern::new(pattern, use_regex)?.is_match(path))
    }
}
