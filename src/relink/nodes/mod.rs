//! # Node Layer
//!
//! The seam to the host scene graph. The engine never touches host objects
//! directly: it lists nodes that expose a file path, writes new paths, and
//! reads the selection through [`NodeAdapter`].
//!
//! ## Implementations
//!
//! - [`script::NukeScript`]: a Nuke `.nk` script edited as text
//! - [`memory::InMemoryNodes`]: in-memory fake for tests, with per-node write
//!   rejection
//!
//! Writes take effect immediately. Each call is independent; a failed write
//! leaves every other node untouched.

use crate::error::Result;
use crate::model::NodeRef;

pub mod memory;
pub mod script;

pub trait NodeAdapter {
    /// Every node that exposes a file path, in scene order.
    fn list_path_nodes(&self) -> Result<Vec<NodeRef>>;

    /// Write `new_path` to the node's file attribute.
    fn set_path(&mut self, full_name: &str, new_path: &str) -> Result<()>;

    /// Full names of the selected path nodes.
    fn get_selected(&self) -> Result<Vec<String>> {
        Ok(self
            .list_path_nodes()?
            .into_iter()
            .filter(|node| node.selected)
            .map(|node| node.full_name)
            .collect())
    }

    /// Current path of one node, or `None` if no path node has that name.
    fn node_path(&self, full_name: &str) -> Result<Option<String>> {
        Ok(self
            .list_path_nodes()?
            .into_iter()
            .find(|node| node.full_name == full_name)
            .map(|node| node.path))
    }
}
