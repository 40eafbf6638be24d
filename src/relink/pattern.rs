//! # Path Matching and Rewriting
//!
//! Pure string operations over stored node paths. Nothing here touches nodes
//! or the store.
//!
//! ## Semantics
//!
//! - **Matching** is a search anywhere in the path, in both modes. A literal
//!   pattern is a plain substring test; a regex pattern uses `Regex::is_match`.
//! - **Replacement** rewrites the *first* match only. In regex mode the new
//!   root may reference capture groups (`$1`, `${name}`); in literal mode it is
//!   inserted verbatim. A reference to a group the pattern does not define is
//!   rejected rather than expanded to nothing.
//! - An empty pattern is rejected: it would match every path.
//! - A path that does not match comes back unchanged (`None` from
//!   [`PathPattern::rewrite`]), and callers count it as not affected.

use crate::error::{RelinkError, Result};
use regex::Regex;

/// A compiled old-path pattern.
#[derive(Debug, Clone)]
pub enum PathPattern {
    Literal(String),
    Regex(Regex),
}

impl PathPattern {
    pub fn new(pattern: &str, use_regex: bool) -> Result<Self> {
        if pattern.is_empty() {
            return Err(RelinkError::InvalidPattern(
                "pattern cannot be empty".to_string(),
            ));
        }

        if use_regex {
            let regex = Regex::new(pattern)
                .map_err(|e| RelinkError::InvalidPattern(format!("{}: {}", pattern, e)))?;
            Ok(PathPattern::Regex(regex))
        } else {
            Ok(PathPattern::Literal(pattern.to_string()))
        }
    }

    pub fn literal(pattern: &str) -> Result<Self> {
        Self::new(pattern, false)
    }

    /// Reject a regex replacement that names a group the pattern does not
    /// define. Such a reference would expand to nothing and silently drop
    /// part of the path (`$env(SHOW)` becomes `(SHOW)`). Write `$$` for a
    /// literal dollar sign.
    pub fn check_replacement(&self, new_root: &str) -> Result<()> {
        let PathPattern::Regex(re) = self else {
            return Ok(());
        };
        for name in capture_references(new_root) {
            let defined = match name.parse::<usize>() {
                Ok(index) => index < re.captures_len(),
                Err(_) => re.capture_names().flatten().any(|group| group == name),
            };
            if !defined {
                return Err(RelinkError::InvalidPattern(format!(
                    "replacement refers to undefined group ${} (use $$ for a literal $)",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            PathPattern::Literal(s) => path.contains(s.as_str()),
            PathPattern::Regex(re) => re.is_match(path),
        }
    }

    /// Rewrite the first match with `new_root`, or `None` when nothing matches.
    pub fn rewrite(&self, path: &str, new_root: &str) -> Option<String> {
        if !self.is_match(path) {
            return None;
        }
        let rewritten = match self {
            PathPattern::Literal(s) => path.replacen(s.as_str(), new_root, 1),
            PathPattern::Regex(re) => re.replace(path, new_root).into_owned(),
        };
        Some(rewritten)
    }

    /// Like [`rewrite`](Self::rewrite), but returns the input unchanged on no match.
    pub fn replace(&self, path: &str, new_root: &str) -> String {
        self.rewrite(path, new_root)
            .unwrap_or_else(|| path.to_string())
    }
}

pub fn matches(candidate_path: &str, pattern: &str, use_regex: bool) -> Result<bool> {
    Ok(PathPattern::new(pattern, use_regex)?.is_match(candidate_path))
}

pub fn replace(path: &str, old_pattern: &str, new_root: &str, use_regex: bool) -> Result<String> {
    let pattern = PathPattern::new(old_pattern, use_regex)?;
    pattern.check_replacement(new_root)?;
    Ok(pattern.replace(path, new_root))
}

/// Group names and indexes referenced by `$name`, `$1` or `${name}` in a
/// regex replacement, following the `regex` crate's expansion rules.
fn capture_references(replacement: &str) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut rest = replacement;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        if let Some(after) = rest.strip_prefix('$') {
            rest = after;
            continue;
        }
        if let Some(braced) = rest.strip_prefix('{') {
            // An unclosed brace is copied literally.
            if let Some(end) = braced.find('}') {
                if end > 0 {
                    refs.push(&braced[..end]);
                }
                rest = &braced[end + 1..];
            }
            continue;
        }
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len > 0 {
            refs.push(&rest[..len]);
            rest = &rest[len..];
        }
    }
    refs
}

/// Join `base_dir` with the file name portion of `path`.
///
/// Scripts use forward slashes on every platform, but backslash-separated
/// paths are split too.
pub fn append_replacement_path(base_dir: &str, path: &str) -> String {
    let file_name = path
        .rfind(['/', '\\'])
        .map(|idx| &path[idx + 1..])
        .unwrap_or(path);

    let base = base_dir.trim_end_matches(['/', '\\']);
    if base.is_empty() {
        if base_dir.is_empty() {
            return file_name.to_string();
        }
        // base_dir was the filesystem root
        return format!("/{}", file_name);
    }
    format!("{}/{}", base, file_name)
}
