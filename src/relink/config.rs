//! # Configuration
//!
//! Relink reads a small `config.json` naming the directory redirect used by
//! [`compute_new_path`](crate::api::RelinkApi::compute_new_path) and the
//! `redirect` command.
//!
//! ## Keys
//!
//! | Key | Alias | Description |
//! |-----|-------|-------------|
//! | `old_directory` | `old_path` | Directory prefix to replace |
//! | `new_directory` | `new_path` | Directory to point nodes at |
//!
//! Values given on the command line override the file. A missing file yields
//! the defaults (both unset).

use crate::error::{RelinkError, Result};
use crate::pattern::append_replacement_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelinkConfig {
    #[serde(default, alias = "old_path", skip_serializing_if = "Option::is_none")]
    pub old_directory: Option<String>,

    #[serde(default, alias = "new_path", skip_serializing_if = "Option::is_none")]
    pub new_directory: Option<String>,
}

/// How configured directories turn an old path into a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// Replace the first occurrence of `old` with `new`.
    Replace { old: String, new: String },
    /// Point the file name at `new_dir`, dropping the old directory.
    Redirect { new_dir: String },
    Unset,
}

impl RewriteRule {
    /// Apply the rule to a path. Returns the input when the rule does not apply.
    pub fn apply(&self, path: &str) -> String {
        match self {
            RewriteRule::Replace { old, new } => path.replacen(old.as_str(), new, 1),
            RewriteRule::Redirect { new_dir } => append_replacement_path(new_dir, path),
            RewriteRule::Unset => path.to_string(),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, RewriteRule::Unset)
    }
}

impl RelinkConfig {
    pub fn new(old_directory: Option<String>, new_directory: Option<String>) -> Self {
        Self {
            old_directory: non_empty(old_directory),
            new_directory: non_empty(new_directory),
        }
    }

    /// Load `config.json` from `config_dir`, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        Self::load_file(config_dir.as_ref().join(CONFIG_FILENAME))
    }

    pub fn load_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            log::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(RelinkError::Io)?;
        let config: RelinkConfig =
            serde_json::from_str(&content).map_err(RelinkError::Serialization)?;
        if config.old_directory.is_none() || config.new_directory.is_none() {
            log::warn!("Incomplete config in {}", config_path.display());
        }
        Ok(Self::new(config.old_directory, config.new_directory))
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        self.save_file(config_dir.as_ref().join(CONFIG_FILENAME))
    }

    pub fn save_file<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(RelinkError::Io)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(RelinkError::Serialization)?;
        fs::write(config_path, content).map_err(RelinkError::Io)?;
        Ok(())
    }

    /// Explicit values win over whatever was loaded.
    pub fn with_overrides(
        mut self,
        old_directory: Option<String>,
        new_directory: Option<String>,
    ) -> Self {
        if let Some(old) = non_empty(old_directory) {
            self.old_directory = Some(old);
        }
        if let Some(new) = non_empty(new_directory) {
            self.new_directory = Some(new);
        }
        self
    }

    pub fn rewrite_rule(&self) -> RewriteRule {
        match (&self.old_directory, &self.new_directory) {
            (Some(old), Some(new)) => RewriteRule::Replace {
                old: old.clone(),
                new: new.clone(),
            },
            (None, Some(new)) => RewriteRule::Redirect {
                new_dir: new.clone(),
            },
            _ => RewriteRule::Unset,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
