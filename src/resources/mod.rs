//! Idempotent projection-entry primitives (check + apply pattern).
pub mod copy;
pub mod helpers;
pub mod link;

use std::fmt;
use std::io;
use std::path::Path;

/// Minimal interface for entries that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this entry.
    fn description(&self) -> String;

    /// Create the entry.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Replace a stale projection at the target, never a foreign entry
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the entry cannot be created.
    fn apply(&self) -> io::Result<ResourceChange>;

    /// Remove the entry, undoing a previous `apply()`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the entry cannot be removed.
    fn remove(&self) -> io::Result<ResourceChange>;
}

/// What kind of filesystem entry occupies a path (without following links).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Real directory.
    Directory,
    /// Symbolic link (dangling or not).
    Symlink,
    /// Anything else (sockets, fifos, devices).
    Other,
}

impl EntryKind {
    /// Classify the entry at `path`; `None` if nothing is there.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::symlink_metadata(path).ok()?;
        let ft = meta.file_type();
        Some(if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        })
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "entry",
        })
    }
}

/// State of a projection entry.
///
/// # Examples
///
/// ```
/// use modlink_cli::resources::{EntryKind, ResourceState};
///
/// let missing = ResourceState::Missing;
/// let stale = ResourceState::Incorrect { current: "/old/path".into() };
/// let blocked = ResourceState::Conflict { kind: EntryKind::File };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(stale, blocked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the target.
    Missing,
    /// The target already is the desired projection.
    Correct,
    /// The target is a projection entry, but a stale one.
    Incorrect {
        /// What the target currently holds.
        current: String,
    },
    /// The target is occupied by something that is not a projection entry.
    Conflict {
        /// Kind of the occupying entry.
        kind: EntryKind,
    },
    /// The entry cannot be applied (e.g., its source is missing).
    Invalid {
        /// Reason why the entry cannot be applied.
        reason: String,
    },
}

/// Result of applying an entry change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Entry was created, replaced, or removed.
    Applied,
    /// Entry was already correct (no change needed).
    AlreadyCorrect,
    /// Nothing was done.
    Skipped {
        /// Reason why the entry was skipped.
        reason: String,
    },
}

/// Unified interface for entries that can be checked and applied.
pub trait Resource: Applicable {
    /// Check the current state of the entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> io::Result<ResourceState>;
}
