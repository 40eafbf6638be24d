use crate::commands::{CmdMessage, CmdResult};
use crate::error::{RelinkError, Result};
use crate::model::{ApplyReport, NodeFailure, NodeRef, PathChange};
use crate::nodes::NodeAdapter;

/// Path nodes, optionally narrowed to the current selection.
pub fn candidate_nodes<N: NodeAdapter>(nodes: &N, selected_only: bool) -> Result<Vec<NodeRef>> {
    let all = nodes.list_path_nodes()?;
    if !selected_only {
        return Ok(all);
    }
    let selected = nodes.get_selected()?;
    Ok(all
        .into_iter()
        .filter(|node| selected.contains(&node.full_name))
        .collect())
}

/// Apply each change independently. Failed writes are collected, not raised.
pub fn apply_changes<N: NodeAdapter>(nodes: &mut N, changes: Vec<PathChange>) -> ApplyReport {
    let mut report = ApplyReport::default();
    for change in changes {
        match nodes.set_path(&change.full_name, &change.new_path) {
            Ok(()) => {
                log::debug!(
                    "{}: {} -> {}",
                    change.full_name,
                    change.old_path,
                    change.new_path
                );
                report.applied.push(change);
            }
            Err(err) => {
                log::warn!("Could not update {}: {}", change.full_name, err);
                report.failures.push(NodeFailure {
                    full_name: change.full_name,
                    reason: failure_reason(err),
                });
            }
        }
    }
    report
}

fn failure_reason(err: RelinkError) -> String {
    match err {
        RelinkError::Node { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// Per-failure warnings followed by a one-line summary.
pub fn report_messages(result: &mut CmdResult, report: &ApplyReport, verb: &str) {
    for failure in &report.failures {
        result.add_message(CmdMessage::warning(format!(
            "Failed to update {}: {}",
            failure.full_name, failure.reason
        )));
    }

    let summary = format!(
        "{} {} of {} nodes.",
        verb,
        report.affected(),
        report.attempted()
    );
    if report.failures.is_empty() {
        result.add_message(CmdMessage::success(summary));
    } else {
        result.add_message(CmdMessage::warning(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::nodes::memory::InMemoryNodes;

    fn change(name: &str, old: &str, new: &str) -> PathChange {
        PathChange {
            full_name: name.into(),
            old_path: old.into(),
            new_path: new.into(),
        }
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let mut nodes = InMemoryNodes::new()
            .with_node("A", "/a")
            .with_node("B", "/b")
            .with_node("C", "/c")
            .reject_writes_for("B");

        let report = apply_changes(
            &mut nodes,
            vec![
                change("A", "/a", "/x/a"),
                change("B", "/b", "/x/b"),
                change("C", "/c", "/x/c"),
            ],
        );

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.affected(), 2);
        assert_eq!(report.affected(), nodes.write_count());
        assert_eq!(report.failures[0].full_name, "B");
        assert_eq!(report.failures[0].reason, "write rejected");
        assert_eq!(nodes.path_of("C"), Some("/x/c"));
    }

    #[test]
    fn selected_only_narrows_candidates() {
        let nodes = InMemoryNodes::new()
            .with_node("A", "/a")
            .with_selected_node("B", "/b");

        assert_eq!(candidate_nodes(&nodes, false).unwrap().len(), 2);
        let selected = candidate_nodes(&nodes, true).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].full_name, "B");
    }

    #[test]
    fn summary_is_a_warning_when_something_failed() {
        let mut result = CmdResult::default();
        let report = ApplyReport {
            applied: vec![change("A", "/a", "/b")],
            failures: vec![NodeFailure {
                full_name: "B".into(),
                reason: "write rejected".into(),
            }],
        };
        report_messages(&mut result, &report, "Relinked");

        assert_eq!(result.messages.len(), 2);
        assert!(result.messages[0].content.contains("Failed to update B"));
        assert_eq!(result.messages[1].level, MessageLevel::Warning);
        assert_eq!(result.messages[1].content, "Relinked 1 of 2 nodes.");
    }
}
