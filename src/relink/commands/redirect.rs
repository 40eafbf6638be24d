use crate::commands::{CmdMessage, CmdResult};
use crate::config::{RelinkConfig, RewriteRule};
use crate::error::{RelinkError, Result};
use crate::model::{PathChange, RelinkOutcome};
use crate::nodes::NodeAdapter;
use crate::store::DataStore;

use super::helpers::{apply_changes, candidate_nodes, report_messages};

pub fn plan<N: NodeAdapter>(
    nodes: &N,
    rule: &RewriteRule,
    selected_only: bool,
) -> Result<Vec<PathChange>> {
    Ok(candidate_nodes(nodes, selected_only)?
        .into_iter()
        .filter_map(|node| {
            let new_path = rule.apply(&node.path);
            if new_path.is_empty() || new_path == node.path {
                return None;
            }
            Some(PathChange {
                full_name: node.full_name,
                old_path: node.path,
                new_path,
            })
        })
        .collect())
}

fn require_rule(config: &RelinkConfig) -> Result<RewriteRule> {
    let rule = config.rewrite_rule();
    if rule.is_unset() {
        return Err(RelinkError::Api(
            "No redirect configured: new_directory is not set".to_string(),
        ));
    }
    Ok(rule)
}

pub fn preview<N: NodeAdapter>(
    nodes: &N,
    config: &RelinkConfig,
    selected_only: bool,
) -> Result<CmdResult> {
    let rule = require_rule(config)?;
    let changes = plan(nodes, &rule, selected_only)?;

    let mut result = CmdResult::default();
    if changes.is_empty() {
        result.add_message(CmdMessage::info("No paths would change."));
    }
    Ok(result.with_planned_changes(changes))
}

/// Apply the configured directory redirect to all (or only selected) path
/// nodes. A history record is written when at least one node was attempted.
pub fn run<S: DataStore, N: NodeAdapter>(
    store: &mut S,
    nodes: &mut N,
    config: &RelinkConfig,
    selected_only: bool,
) -> Result<CmdResult> {
    let rule = require_rule(config)?;
    let changes = plan(nodes, &rule, selected_only)?;

    let mut result = CmdResult::default();
    if changes.is_empty() {
        let message = if selected_only {
            "No selected nodes to redirect."
        } else {
            "No paths would change."
        };
        log::info!("{}", message);
        result.add_message(CmdMessage::info(message));
        return Ok(result);
    }

    let report = apply_changes(nodes, changes);
    let old = config.old_directory.clone().unwrap_or_default();
    let new = config.new_directory.clone().unwrap_or_default();
    let record_id = store.record_relink(&old, &new, false, report.affected())?;
    log::info!(
        "Redirected {} of {} nodes to {}",
        report.affected(),
        report.attempted(),
        new
    );

    report_messages(&mut result, &report, "Redirected");
    result.relink = Some(RelinkOutcome { record_id, report });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::memory::InMemoryNodes;
    use crate::store::memory::InMemoryStore;

    fn replace_config() -> RelinkConfig {
        RelinkConfig::new(Some("/old".into()), Some("/new".into()))
    }

    #[test]
    fn replaces_configured_directory() {
        let mut store = InMemoryStore::new();
        let mut nodes = InMemoryNodes::new()
            .with_node("Read1", "/old/path.ext")
            .with_node("Read2", "/other/path.ext");

        let result = run(&mut store, &mut nodes, &replace_config(), false).unwrap();

        assert_eq!(nodes.path_of("Read1"), Some("/new/path.ext"));
        assert_eq!(nodes.path_of("Read2"), Some("/other/path.ext"));
        assert_eq!(result.affected_count(), 1);

        let history = store.relink_history().unwrap();
        assert_eq!(history[0].old_path_regex, "/old");
        assert_eq!(history[0].new_path, "/new");
        assert_eq!(history[0].affected_nodes, 1);
    }

    #[test]
    fn redirect_only_new_directory() {
        let mut store = InMemoryStore::new();
        let mut nodes = InMemoryNodes::new().with_node("Read1", "/some/deep/plate.exr");
        let config = RelinkConfig::new(None, Some("/mnt/plates".into()));

        run(&mut store, &mut nodes, &config, false).unwrap();
        assert_eq!(nodes.path_of("Read1"), Some("/mnt/plates/plate.exr"));
    }

    #[test]
    fn selected_only() {
        let mut store = InMemoryStore::new();
        let mut nodes = InMemoryNodes::new()
            .with_node("Read1", "/old/a.exr")
            .with_selected_node("Read2", "/old/b.exr");

        run(&mut store, &mut nodes, &replace_config(), true).unwrap();
        assert_eq!(nodes.path_of("Read1"), Some("/old/a.exr"));
        assert_eq!(nodes.path_of("Read2"), Some("/new/b.exr"));
    }

    #[test]
    fn nothing_selected_records_nothing() {
        let mut store = InMemoryStore::new();
        let mut nodes = InMemoryNodes::new().with_node("Read1", "/old/a.exr");

        let result = run(&mut store, &mut nodes, &replace_config(), true).unwrap();
        assert!(result.relink.is_none());
        assert!(store.relink_history().unwrap().is_empty());
    }

    #[test]
    fn unset_config_is_rejected() {
        let mut store = InMemoryStore::new();
        let mut nodes = InMemoryNodes::new().with_node("Read1", "/old/a.exr");
        let config = RelinkConfig::new(Some("/old".into()), None);

        assert!(matches!(
            run(&mut store, &mut nodes, &config, false),
            Err(RelinkError::Api(_))
        ));
        assert_eq!(nodes.write_count(), 0);
    }

    #[test]
    fn preview_lists_changes() {
        let nodes = InMemoryNodes::new()
            .with_node("Read1", "/old/a.exr")
            .with_node("Read2", "/elsewhere/b.exr");

        let result = preview(&nodes, &replace_config(), false).unwrap();
        assert_eq!(result.planned_changes.len(), 1);
        assert_eq!(result.planned_changes[0].new_path, "/new/a.exr");
    }
}
