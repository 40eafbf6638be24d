//! # Rendering
//!
//! Turns command results into terminal text. Layout (column widths, padding)
//! is computed here with `unicode-width` so node names with wide characters
//! still line up. Every `render_*` function returns a string and takes an
//! explicit colour switch so tests can check plain output; `print_*` wrappers
//! decide colour from whether stdout is a terminal.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use relink::api::{CmdMessage, MessageLevel};
use relink::model::{NodeRef, PathChange, RelinkRecord, SavedStateInfo, Snapshot};
use std::io::IsTerminal;
use unicode_width::UnicodeWidthStr;

pub const TIME_WIDTH: usize = 14;
pub const SELECTED_MARKER: &str = "*";
const MAX_NAME_WIDTH: usize = 40;

fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

fn paint(text: &str, use_color: bool, style: fn(&str) -> ColoredString) -> String {
    if use_color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Left-align `text` in a column `width` cells wide.
fn pad_to(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn column_width<'a>(items: impl Iterator<Item = &'a str>) -> usize {
    items.map(|s| s.width()).max().unwrap_or(0).min(MAX_NAME_WIDTH)
}

pub fn render_messages(messages: &[CmdMessage], use_color: bool) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => paint(&message.content, use_color, |s| s.dimmed()),
            MessageLevel::Success => paint(&message.content, use_color, |s| s.green()),
            MessageLevel::Warning => paint(&message.content, use_color, |s| s.yellow()),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages, use_color()));
}

pub fn render_nodes(nodes: &[NodeRef], use_color: bool) -> String {
    let width = column_width(nodes.iter().map(|n| n.full_name.as_str()));
    let mut out = String::new();
    for node in nodes {
        let marker = if node.selected { SELECTED_MARKER } else { " " };
        out.push_str(&format!(
            "{} {}  {}\n",
            paint(marker, use_color, |s| s.yellow()),
            paint(&pad_to(&node.full_name, width), use_color, |s| s.bold()),
            node.path
        ));
    }
    out
}

pub fn print_nodes(nodes: &[NodeRef]) {
    print!("{}", render_nodes(nodes, use_color()));
}

pub fn render_changes(changes: &[PathChange], use_color: bool) -> String {
    let width = column_width(changes.iter().map(|c| c.full_name.as_str()));
    let indent = " ".repeat(width.max(1));
    let mut out = String::new();
    for change in changes {
        out.push_str(&format!(
            "{}  {}\n{}  {} {}\n",
            paint(&pad_to(&change.full_name, width), use_color, |s| s.bold()),
            paint(&change.old_path, use_color, |s| s.red()),
            indent,
            paint("->", use_color, |s| s.dimmed()),
            paint(&change.new_path, use_color, |s| s.green()),
        ));
    }
    out
}

pub fn print_changes(changes: &[PathChange]) {
    print!("{}", render_changes(changes, use_color()));
}

pub fn render_states(states: &[SavedStateInfo], use_color: bool) -> String {
    let width = column_width(states.iter().map(|s| s.version.as_str()));
    let mut out = String::new();
    for state in states {
        out.push_str(&format!(
            "  {}  {}  {}\n",
            paint(&pad_to(&state.version, width), use_color, |s| s.yellow()),
            state.timestamp.format("%Y-%m-%d %H:%M:%S"),
            paint(&format_time_ago(state.timestamp), use_color, |s| s.dimmed()),
        ));
    }
    out
}

pub fn print_states(states: &[SavedStateInfo]) {
    print!("{}", render_states(states, use_color()));
}

pub fn render_history(history: &[RelinkRecord], use_color: bool) -> String {
    let mut out = String::new();
    for record in history {
        let mode = if record.use_regex { "regex" } else { "text" };
        out.push_str(&format!(
            "{:>4}  {}  [{}] {} -> {}  ({} nodes)\n",
            paint(&format!("#{}", record.id), use_color, |s| s.yellow()),
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            mode,
            record.old_path_regex,
            record.new_path,
            record.affected_nodes
        ));
    }
    out
}

pub fn print_history(history: &[RelinkRecord]) {
    print!("{}", render_history(history, use_color()));
}

pub fn render_snapshot(snapshot: &Snapshot, use_color: bool) -> String {
    let width = column_width(snapshot.state.keys().map(String::as_str));
    let mut out = format!(
        "{}\n",
        paint(&format!("State {}", snapshot.version), use_color, |s| s.bold())
    );
    for (name, path) in &snapshot.state {
        out.push_str(&format!("  {}  {}\n", pad_to(name, width), path));
    }
    out
}

pub fn print_snapshot(snapshot: &Snapshot) {
    print!("{}", render_snapshot(snapshot, use_color()));
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
