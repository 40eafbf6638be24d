use crate::commands::{CmdMessage, CmdResult};
use crate::error::{RelinkError, Result};
use crate::model::{ApplyReport, NodeFailure, PathChange, Snapshot, StateMap};
use crate::nodes::NodeAdapter;
use crate::store::DataStore;

use super::helpers::{apply_changes, report_messages};

/// Capture the current paths of `names` under `version`.
///
/// Names that do not resolve to a path node are skipped with a warning; the
/// snapshot holds the resolvable rest. Without `overwrite` an existing
/// version is rejected and left untouched.
pub fn save<S: DataStore, N: NodeAdapter>(
    store: &mut S,
    nodes: &N,
    version: &str,
    names: &[String],
    overwrite: bool,
) -> Result<CmdResult> {
    let version = version.trim();
    if version.is_empty() {
        return Err(RelinkError::InvalidVersion(
            "version label cannot be empty".to_string(),
        ));
    }
    if !overwrite && store.state_exists(version)? {
        return Err(RelinkError::DuplicateVersion(version.to_string()));
    }

    let mut result = CmdResult::default();
    let mut state = StateMap::new();
    for name in names {
        match nodes.node_path(name)? {
            Some(path) => {
                state.insert(name.clone(), path);
            }
            None => {
                log::warn!("Node {} not found, not included in state {}", name, version);
                result.add_message(CmdMessage::warning(format!(
                    "Node {} not found, skipping",
                    name
                )));
            }
        }
    }

    if overwrite {
        store.replace_state(version, &state)?;
    } else {
        store.save_state(version, &state)?;
    }
    log::info!("Saved state {} ({} nodes)", version, state.len());

    result.add_message(CmdMessage::success(format!(
        "State {} saved ({} nodes).",
        version,
        state.len()
    )));
    result.saved_version = Some(version.to_string());
    Ok(result.with_snapshot(Snapshot {
        version: version.to_string(),
        state,
    }))
}

/// Look up a saved state. Does not touch any node.
pub fn load<S: DataStore>(store: &S, version: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match store.load_state(version)? {
        Some(state) => {
            log::info!("Loaded state {}", version);
            Ok(result.with_snapshot(Snapshot {
                version: version.to_string(),
                state,
            }))
        }
        None => {
            log::info!("No state found for version {}", version);
            result.add_message(CmdMessage::warning(format!(
                "No state found for version {}",
                version
            )));
            Ok(result)
        }
    }
}

pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    let states = store.list_states()?;
    let mut result = CmdResult::default();
    if states.is_empty() {
        result.add_message(CmdMessage::info("No saved states."));
    }
    Ok(result.with_states(states))
}

/// Write each `{name: path}` pair back through the adapter, independently.
/// Nodes missing from the scene become failures.
pub fn execute_restore<N: NodeAdapter>(nodes: &mut N, state: &StateMap) -> Result<ApplyReport> {
    let mut changes = Vec::new();
    let mut missing = Vec::new();
    for (name, path) in state {
        match nodes.node_path(name)? {
            Some(current) => changes.push(PathChange {
                full_name: name.clone(),
                old_path: current,
                new_path: path.clone(),
            }),
            None => {
                log::warn!("Node {} not found, skipping", name);
                missing.push(NodeFailure {
                    full_name: name.clone(),
                    reason: "node not found".to_string(),
                });
            }
        }
    }

    let mut report = apply_changes(nodes, changes);
    report.failures.extend(missing);
    Ok(report)
}

/// Load `version` and restore it. A missing version is reported, not raised.
pub fn restore<S: DataStore, N: NodeAdapter>(
    store: &S,
    nodes: &mut N,
    version: &str,
) -> Result<CmdResult> {
    let mut result = load(store, version)?;
    let Some(snapshot) = result.snapshot.as_ref() else {
        return Ok(result);
    };

    let report = execute_restore(nodes, &snapshot.state)?;
    log::info!(
        "Restored state {}: {} of {} nodes",
        version,
        report.affected(),
        report.attempted()
    );
    report_messages(&mut result, &report, "Restored");
    result.restored = Some(report);
    Ok(result)
}
