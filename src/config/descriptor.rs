//! Descriptor file parsing.
//!
//! A descriptor is a plain-text list of rules, one per line:
//!
//! ```text
//! # comment
//! src/bin          bin/
//! docs/README.md   README.md
//! @import          vendor/lib
//! ```
//!
//! Lines are never checked against the filesystem here; existence is the
//! projection engine's concern.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DescriptorError;

/// Marker token that turns a line into an import rule.
pub const IMPORT_MARKER: &str = "@import";

/// One line of intent in a descriptor.
///
/// # Examples
///
/// ```
/// use modlink_cli::config::descriptor::Rule;
///
/// let rule = Rule::parse_line("src/lib/  lib//").unwrap().unwrap();
/// assert_eq!(
///     rule,
///     Rule::Mapping { source: "src/lib".into(), target: "lib".into() }
/// );
/// assert_eq!(rule.to_string(), "src/lib lib");
///
/// assert!(Rule::parse_line("   # comment").unwrap().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Project `source` (relative to the module base) onto `target`
    /// (relative to the root).
    Mapping {
        /// Normalized source path inside the working copy.
        source: String,
        /// Normalized target path under the projection root.
        target: String,
    },
    /// Splice in the rules of the module rooted at `module_root`.
    Import {
        /// Normalized path of the imported module, relative to the base.
        module_root: String,
    },
}

impl Rule {
    /// Parse a single descriptor line.
    ///
    /// Returns `Ok(None)` for comment and blank lines.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the line does not hold exactly
    /// two tokens, or when a path is absolute, empty, or escapes its base.
    pub fn parse_line(line: &str) -> Result<Option<Self>, String> {
        if !is_rule_line(line) {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [first, second] = tokens.as_slice() else {
            return Err(format!("expected 2 fields, found {}", tokens.len()));
        };

        if *first == IMPORT_MARKER {
            let module_root = normalize_rel_path(second).map_err(|e| format!("import {e}"))?;
            return Ok(Some(Self::Import { module_root }));
        }

        let source = normalize_rel_path(first).map_err(|e| format!("source {e}"))?;
        let target = normalize_rel_path(second).map_err(|e| format!("target {e}"))?;
        Ok(Some(Self::Mapping { source, target }))
    }

    /// Target path of a mapping rule; `None` for imports.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Mapping { target, .. } => Some(target),
            Self::Import { .. } => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping { source, target } => write!(f, "{source} {target}"),
            Self::Import { module_root } => write!(f, "{IMPORT_MARKER} {module_root}"),
        }
    }
}

/// Whether `line` carries a rule (i.e. is neither blank nor a comment).
#[must_use]
pub fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Normalize a relative path token.
///
/// Backslashes become `/`, empty and `.` segments are dropped, `..` is
/// folded lexically, and trailing slashes disappear with the empty segment.
///
/// # Errors
///
/// Returns a reason when the path is absolute, empty, or escapes its base.
pub fn normalize_rel_path(raw: &str) -> Result<String, String> {
    let unified = raw.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(format!("path '{raw}' must be relative"));
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(format!("path '{raw}' escapes its base"));
                }
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Err(format!("path '{raw}' is empty"));
    }
    Ok(parts.join("/"))
}

/// A parsed descriptor together with the directory it was read from.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Descriptor file path.
    pub path: PathBuf,
    /// Directory that relative sources and imports resolve against.
    pub base_dir: PathBuf,
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
}

impl ModuleDescriptor {
    /// Read and parse the descriptor at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Unreadable`] if the file cannot be read and
    /// [`DescriptorError::Malformed`] for the first invalid line.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let text = read(path)?;
        Self::parse(path, &text)
    }

    /// Parse descriptor `text` as if it had been read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Malformed`] for the first invalid line.
    pub fn parse(path: &Path, text: &str) -> Result<Self, DescriptorError> {
        let mut rules = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            match Rule::parse_line(line) {
                Ok(Some(rule)) => rules.push(rule),
                Ok(None) => {}
                Err(reason) => {
                    return Err(DescriptorError::Malformed {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        reason,
                    });
                }
            }
        }

        let base_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self {
            path: path.to_path_buf(),
            base_dir,
            rules,
        })
    }
}

/// Read raw descriptor text.
///
/// # Errors
///
/// Returns [`DescriptorError::Unreadable`] if the file cannot be read.
pub fn read(path: &Path) -> Result<String, DescriptorError> {
    std::fs::read_to_string(path).map_err(|source| DescriptorError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Append `rule` to the descriptor at `path`, creating the file if needed.
///
/// # Errors
///
/// Returns an error if the existing file cannot be read or the new content
/// cannot be written.
pub fn append_rule(path: &Path, rule: &Rule) -> Result<(), DescriptorError> {
    let mut text = if path.exists() {
        read(path)?
    } else {
        String::new()
    };
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&rule.to_string());
    text.push('\n');
    write(path, &text)
}

/// Drop every mapping rule whose target equals `target` (after
/// normalization) and return how many lines were removed.
///
/// Comments, blank lines, and lines that fail to parse are kept verbatim.
///
/// # Errors
///
/// Returns an error if `target` is not a valid relative path or the file
/// cannot be read or written.
pub fn remove_target(path: &Path, target: &str) -> Result<usize, DescriptorError> {
    let wanted = normalize_rel_path(target).map_err(|reason| DescriptorError::Malformed {
        path: path.to_path_buf(),
        line: 0,
        reason: format!("target {reason}"),
    })?;

    let text = read(path)?;
    let mut removed = 0usize;
    let mut kept = String::with_capacity(text.len());
    for line in text.lines() {
        let drop = matches!(
            Rule::parse_line(line),
            Ok(Some(Rule::Mapping { target: ref t, .. })) if *t == wanted
        );
        if drop {
            removed += 1;
        } else {
            kept.push_str(line);
            kept.push('\n');
        }
    }

    if removed > 0 {
        write(path, &kept)?;
    }
    Ok(removed)
}

fn write(path: &Path, text: &str) -> Result<(), DescriptorError> {
    std::fs::write(path, text).map_err(|source| DescriptorError::Unwritable {
        path: path.to_path_buf(),
        source,
    })
}
