use super::NodeAdapter;
use crate::error::{RelinkError, Result};
use crate::model::NodeRef;
use std::collections::HashSet;

/// In-memory scene for testing. Does NOT persist anything.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNodes {
    nodes: Vec<NodeRef>,
    rejected: HashSet<String>,
    writes: usize,
}

impl InMemoryNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, full_name: &str, path: &str) -> Self {
        self.nodes.push(NodeRef::new(full_name, path));
        self
    }

    pub fn with_selected_node(mut self, full_name: &str, path: &str) -> Self {
        self.nodes.push(NodeRef::new(full_name, path).selected());
        self
    }

    /// Make every write to `full_name` fail, as a host rejecting the value would.
    pub fn reject_writes_for(mut self, full_name: &str) -> Self {
        self.rejected.insert(full_name.to_string());
        self
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn path_of(&self, full_name: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.full_name == full_name)
            .map(|n| n.path.as_str())
    }
}

impl NodeAdapter for InMemoryNodes {
    fn list_path_nodes(&self) -> Result<Vec<NodeRef>> {
        Ok(self.nodes.clone())
    }

    fn set_path(&mut self, full_name: &str, new_path: &str) -> Result<()> {
        if self.rejected.contains(full_name) {
            return Err(RelinkError::node(full_name, "write rejected"));
        }
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.full_name == full_name)
            .ok_or_else(|| RelinkError::node(full_name, "no such node"))?;
        node.path = new_path.to_string();
        self.writes += 1;
        Ok(())
    }
}
