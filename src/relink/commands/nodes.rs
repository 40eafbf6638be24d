use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::NodeRef;
use crate::nodes::NodeAdapter;
use crate::pattern::PathPattern;

use super::helpers::candidate_nodes;

/// Path nodes whose current path matches `pattern`.
pub fn find_nodes_with_paths<N: NodeAdapter>(
    nodes: &N,
    pattern: &PathPattern,
) -> Result<Vec<NodeRef>> {
    Ok(nodes
        .list_path_nodes()?
        .into_iter()
        .filter(|node| pattern.is_match(&node.path))
        .collect())
}

pub fn list<N: NodeAdapter>(nodes: &N, selected_only: bool) -> Result<CmdResult> {
    let listed = candidate_nodes(nodes, selected_only)?;
    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info(if selected_only {
            "No selected nodes with file paths."
        } else {
            "No nodes with file paths."
        }));
    }
    Ok(result.with_listed_nodes(listed))
}

pub fn find<N: NodeAdapter>(nodes: &N, pattern: &str, use_regex: bool) -> Result<CmdResult> {
    let pattern = PathPattern::new(pattern, use_regex)?;
    let found = find_nodes_with_paths(nodes, &pattern)?;
    let mut result = CmdResult::default();
    if found.is_empty() {
        result.add_message(CmdMessage::info("No nodes with matching paths found."));
    }
    Ok(result.with_listed_nodes(found))
}
