use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{PathChange, RelinkOutcome};
use crate::nodes::NodeAdapter;
use crate::pattern::PathPattern;
use crate::store::DataStore;

use super::helpers::{apply_changes, report_messages};
use super::nodes::find_nodes_with_paths;

/// Rewrites for every matching node. Nodes whose path would not change are left out.
pub fn plan<N: NodeAdapter>(
    nodes: &N,
    pattern: &PathPattern,
    new_root: &str,
) -> Result<Vec<PathChange>> {
    pattern.check_replacement(new_root)?;
    let mut changes = Vec::new();
    for node in find_nodes_with_paths(nodes, pattern)? {
        let Some(new_path) = pattern.rewrite(&node.path, new_root) else {
            continue;
        };
        if new_path == node.path {
            continue;
        }
        changes.push(PathChange {
            full_name: node.full_name,
            old_path: node.path,
            new_path,
        });
    }
    Ok(changes)
}

pub fn preview<N: NodeAdapter>(
    nodes: &N,
    old_pattern: &str,
    new_root: &str,
    use_regex: bool,
) -> Result<CmdResult> {
    let pattern = PathPattern::new(old_pattern, use_regex)?;
    let changes = plan(nodes, &pattern, new_root)?;

    let mut result = CmdResult::default();
    if changes.is_empty() {
        result.add_message(CmdMessage::info("No nodes with matching paths found."));
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} nodes would be relinked.",
            changes.len()
        )));
    }
    Ok(result.with_planned_changes(changes))
}

/// Relink every node matching `old_pattern` and append one history record
/// with the number of nodes actually written.
pub fn run<S: DataStore, N: NodeAdapter>(
    store: &mut S,
    nodes: &mut N,
    old_pattern: &str,
    new_path: &str,
    use_regex: bool,
) -> Result<CmdResult> {
    let pattern = PathPattern::new(old_pattern, use_regex)?;
    let changes = plan(nodes, &pattern, new_path)?;
    if changes.is_empty() {
        log::info!("No nodes with matching paths found for {}", old_pattern);
    }

    let report = apply_changes(nodes, changes);
    let record_id = store.record_relink(old_pattern, new_path, use_regex, report.affected())?;
    log::info!(
        "Relinked {} of {} nodes ({} -> {}, history #{})",
        report.affected(),
        report.attempted(),
        old_pattern,
        new_path,
        record_id
    );

    let mut result = CmdResult::default();
    if report.attempted() == 0 {
        result.add_message(CmdMessage::info("No nodes with matching paths found."));
    } else {
        report_messages(&mut result, &report, "Relinked");
    }
    result.relink = Some(RelinkOutcome { record_id, report });
    Ok(result)
}
