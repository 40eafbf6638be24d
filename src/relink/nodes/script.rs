//! Nuke script (`.nk`) adapter.
//!
//! A script is edited as text so that every line the relink does not touch is
//! written back exactly as it was read. Only the `file` knob line of a node is
//! ever rewritten.
//!
//! ```text
//! Read {
//!  file /jobs/show/shots/010/plate.####.exr
//!  name Read1
//!  selected true
//! }
//! Group {
//!  name Group1
//! }
//!  Read {
//!   file "/path with spaces/a.exr"
//!   name Read2              <- full name Group1.Read2
//!  }
//! end_group
//! ```
//!
//! A node is a `Class {` block; knobs are `name value` lines at the block's
//! top level. A `Group` block opens a scope for the nodes that follow it,
//! closed by `end_group`. Values are bare, double-quoted (`\"` and `\\`
//! escapes) or `{braced}`.

use super::NodeAdapter;
use crate::error::{RelinkError, Result};
use crate::model::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static NODE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\{\s*$").expect("node header pattern is valid")
});

const FILE_KNOB: &str = "file";
const GROUP_CLASS: &str = "Group";
const ROOT_CLASS: &str = "Root";

#[derive(Debug, Clone)]
struct ScriptNode {
    full_name: String,
    file_line: usize,
    path: String,
    selected: bool,
}

#[derive(Debug)]
struct OpenNode {
    class: String,
    start: usize,
    depth: i64,
    name: Option<String>,
    file: Option<(usize, String)>,
    selected: bool,
}

/// A Nuke script held in memory, editable through [`NodeAdapter`].
#[derive(Debug, Clone)]
pub struct NukeScript {
    source: Option<PathBuf>,
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
    nodes: Vec<ScriptNode>,
    dirty: bool,
}

/// An empty script with no nodes and no source file.
impl Default for NukeScript {
    fn default() -> Self {
        Self {
            source: None,
            lines: Vec::new(),
            newline: "\n",
            trailing_newline: true,
            nodes: Vec::new(),
            dirty: false,
        }
    }
}

impl NukeScript {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(RelinkError::Io)?;
        let mut script = Self::parse(&text)?;
        script.source = Some(path.to_path_buf());
        log::debug!(
            "Loaded {} with {} path nodes",
            path.display(),
            script.nodes.len()
        );
        Ok(script)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let nodes = scan_nodes(&lines)?;
        Ok(Self {
            source: None,
            lines,
            newline,
            trailing_newline: text.ends_with('\n'),
            nodes,
            dirty: false,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// True once any node path has been rewritten since load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn to_text(&self) -> String {
        let mut text = self.lines.join(self.newline);
        if self.trailing_newline {
            text.push_str(self.newline);
        }
        text
    }

    /// Write the script back to the file it was opened from.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| RelinkError::Api("Script was not opened from a file".to_string()))?;
        self.save_as(path)
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_text()).map_err(RelinkError::Io)?;
        self.dirty = false;
        Ok(())
    }
}

impl NodeAdapter for NukeScript {
    fn list_path_nodes(&self) -> Result<Vec<NodeRef>> {
        Ok(self
            .nodes
            .iter()
            .map(|node| NodeRef {
                full_name: node.full_name.clone(),
                path: node.path.clone(),
                selected: node.selected,
            })
            .collect())
    }

    fn set_path(&mut self, full_name: &str, new_path: &str) -> Result<()> {
        if new_path.contains(['\n', '\r']) {
            return Err(RelinkError::node(full_name, "path contains a line break"));
        }
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.full_name == full_name)
            .ok_or_else(|| RelinkError::node(full_name, "no such node in script"))?;

        let line = &mut self.lines[node.file_line];
        let indent_len = line.len() - line.trim_start().len();
        let indent = line[..indent_len].to_string();
        *line = format!("{}{} {}", indent, FILE_KNOB, quote(new_path));

        node.path = new_path.to_string();
        self.dirty = true;
        Ok(())
    }
}

fn scan_nodes(lines: &[String]) -> Result<Vec<ScriptNode>> {
    let mut groups: Vec<String> = Vec::new();
    let mut nodes = Vec::new();
    let mut open: Option<OpenNode> = None;

    for (idx, line) in lines.iter().enumerate() {
        if open.is_none() {
            if line.trim() == "end_group" {
                if groups.pop().is_none() {
                    return Err(RelinkError::Script {
                        line: idx + 1,
                        message: "end_group without an open Group".to_string(),
                    });
                }
            } else if let Some(caps) = NODE_HEADER.captures(line) {
                open = Some(OpenNode {
                    class: caps[1].to_string(),
                    start: idx,
                    depth: 1,
                    name: None,
                    file: None,
                    selected: false,
                });
            }
            continue;
        }
        let Some(node) = open.as_mut() else {
            continue;
        };

        if node.depth == 1 {
            if let Some((knob, value)) = split_knob(line) {
                match knob {
                    "name" => node.name = Some(unquote(value)),
                    FILE_KNOB => node.file = Some((idx, unquote(value))),
                    "selected" => node.selected = value.trim() == "true",
                    _ => {}
                }
            }
        }

        node.depth += brace_delta(line);
        if node.depth > 0 {
            continue;
        }

        if let Some(done) = open.take() {
            close_node(done, &mut groups, &mut nodes);
        }
    }

    if let Some(node) = open {
        return Err(RelinkError::Script {
            line: node.start + 1,
            message: format!("{} block is never closed", node.class),
        });
    }
    if !groups.is_empty() {
        log::warn!("Script ends inside group {}", groups.join("."));
    }

    Ok(nodes)
}

fn close_node(node: OpenNode, groups: &mut Vec<String>, nodes: &mut Vec<ScriptNode>) {
    if node.class == ROOT_CLASS {
        return;
    }
    let name = node
        .name
        .unwrap_or_else(|| format!("{}_line{}", node.class, node.start + 1));
    let full_name = if groups.is_empty() {
        name.clone()
    } else {
        format!("{}.{}", groups.join("."), name)
    };

    if let Some((file_line, path)) = node.file {
        nodes.push(ScriptNode {
            full_name,
            file_line,
            path,
            selected: node.selected,
        });
    }

    if node.class == GROUP_CLASS {
        groups.push(name);
    }
}

fn split_knob(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.split_once(char::is_whitespace) {
        Some((knob, value)) => Some((knob, value.trim())),
        None => Some((trimmed, "")),
    }
}

/// Net `{`/`}` count of a line, ignoring braces inside quotes or escaped.
fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => delta += 1,
            '}' if !in_quotes => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('"') {
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => break,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => value.push(next),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => value.push('\\'),
                },
                _ => value.push(c),
            }
        }
        return value;
    }
    if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
        return raw[1..raw.len() - 1].to_string();
    }
    raw.to_string()
}

fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '{' | '}' | ';'));
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
