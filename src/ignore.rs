//! Ignore rules loaded from `ignored_files.mod`
//!
//! Each non-blank line of the manifest is one rule:
//! - `*.ext` - ignore every path with that extension
//! - `dir/` - ignore everything under a top-level directory starting with `dir`
//! - anything else - ignore that exact relative path
//!
//! Lines starting with `#` are comments. A bare `*` or `*.` names no
//! extension; it is skipped with a warning rather than ignoring everything.

use std::fs;
use std::io;
use std::path::Path;

/// File name of the ignore manifest at the mod root.
pub const IGNORE_FILE_NAME: &str = "ignored_files.mod";

/// A single parsed ignore rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreRule {
    /// Extension wildcard, stored without the leading dot (`*.psd` -> `psd`)
    Extension(String),
    /// Top-level directory prefix, separator stripped (`music/` -> `music`)
    TopLevelDir(String),
    /// Exact relative path
    Exact(String),
}

impl IgnoreRule {
    /// Parse one manifest line. Returns `None` for blank and comment lines
    /// and for extension wildcards without an extension.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(rest) = line.strip_prefix('*') {
            let ext = rest.strip_prefix('.').unwrap_or(rest);
            if ext.is_empty() {
                tracing::warn!("Ignore rule '{}' has no extension, skipping it", line);
                return None;
            }
            return Some(IgnoreRule::Extension(ext.to_string()));
        }

        if line.ends_with('/') || line.ends_with('\\') {
            let prefix = line.trim_end_matches(['/', '\\']);
            return Some(IgnoreRule::TopLevelDir(normalize(prefix)));
        }

        Some(IgnoreRule::Exact(normalize(line)))
    }

    /// Check whether a normalized relative path matches this rule.
    pub fn matches(&self, relative_path: &str) -> bool {
        match self {
            IgnoreRule::Extension(ext) => {
                Path::new(relative_path).extension().is_some_and(|e| e.to_str() == Some(ext))
            }
            IgnoreRule::TopLevelDir(prefix) => match relative_path.split_once('/') {
                Some((first, _)) => first.starts_with(prefix.as_str()),
                None => false,
            },
            IgnoreRule::Exact(path) => path == relative_path,
        }
    }
}

/// The ignore rules for one build run.
///
/// Loaded once before the walk and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Load rules from `ignored_files.mod` in the given mod root.
    ///
    /// A missing manifest is not an error and yields an empty rule set.
    pub fn load(mod_root: &Path) -> io::Result<Self> {
        Self::load_file(&mod_root.join(IGNORE_FILE_NAME))
    }

    /// Load rules from a specific manifest file.
    pub fn load_file(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!("Parsing ignored files from {}", path.display());
                Ok(Self::parse(&contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Parse rules from manifest text.
    pub fn parse(contents: &str) -> Self {
        Self { rules: contents.lines().filter_map(IgnoreRule::parse).collect() }
    }

    /// Check whether a path relative to the mod root is excluded.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let relative_path = normalize(relative_path);
        self.rules.iter().any(|rule| rule.matches(&relative_path))
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Use forward slashes and drop leading `./` or `/`.
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./");
    path.trim_start_matches('/').to_string()
}
