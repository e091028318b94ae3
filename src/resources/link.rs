//! Symlink projection entry (link mode).
use std::io;
use std::path::{Path, PathBuf};

use super::{Applicable, EntryKind, Resource, ResourceChange, ResourceState};

/// A symlink at `target` pointing at `source`.
#[derive(Debug, Clone)]
pub struct LinkResource {
    /// The file or directory inside the working copy.
    pub source: PathBuf,
    /// Where the link lives under the projection root.
    pub target: PathBuf,
}

impl LinkResource {
    /// Create a new link entry.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for LinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> io::Result<ResourceChange> {
        // A stale link is replaced; anything else must have been cleared by
        // the caller after consulting the conflict policy.
        if super::helpers::fs::is_symlink(&self.target) {
            remove_symlink(&self.target)?;
        }
        super::helpers::fs::ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> io::Result<ResourceChange> {
        if !super::helpers::fs::is_symlink(&self.target) {
            return Ok(ResourceChange::Skipped {
                reason: "target is not a symlink".to_string(),
            });
        }
        remove_symlink(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for LinkResource {
    fn current_state(&self) -> io::Result<ResourceState> {
        if self.source.symlink_metadata().is_err() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        match EntryKind::of(&self.target) {
            None => Ok(ResourceState::Missing),
            Some(EntryKind::Symlink) => {
                let existing = std::fs::read_link(&self.target)?;
                if paths_equal(&existing, &self.source) {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("points to {}", existing.display()),
                    })
                }
            }
            Some(kind) => Ok(ResourceState::Conflict { kind }),
        }
    }
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns the OS error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not `remove_file`).
/// Rust's `symlink_metadata().is_dir()` returns `false` for symlinks, so we check
/// the raw `FILE_ATTRIBUTE_DIRECTORY` flag to detect directory symlinks.
///
/// # Errors
///
/// Returns the OS error if the link cannot be inspected or removed.
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory symlinks,
/// so we check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
