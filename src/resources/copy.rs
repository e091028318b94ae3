//! Hard-linked copy projection entry (copy mode).
use std::io;
use std::path::PathBuf;

use super::helpers::fs::{hardlink_tree, is_hardlinked_copy, remove_entry};
use super::{Applicable, EntryKind, Resource, ResourceChange, ResourceState};

/// A recursive hard-linked reproduction of `source` at `target`.
///
/// Unlike a [`super::link::LinkResource`], the result consists of real files
/// that keep working after the source tree is deleted.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// The file or directory inside the working copy.
    pub source: PathBuf,
    /// Where the copy lives under the projection root.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy entry.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} <= {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> io::Result<ResourceChange> {
        super::helpers::fs::ensure_parent_dir(&self.target)?;
        hardlink_tree(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> io::Result<ResourceChange> {
        if !is_hardlinked_copy(&self.source, &self.target) {
            return Ok(ResourceChange::Skipped {
                reason: "target is not a copy of the source".to_string(),
            });
        }
        remove_entry(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> io::Result<ResourceState> {
        if self.source.symlink_metadata().is_err() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        match EntryKind::of(&self.target) {
            None => Ok(ResourceState::Missing),
            Some(_) if is_hardlinked_copy(&self.source, &self.target) => {
                Ok(ResourceState::Correct)
            }
            Some(kind) => Ok(ResourceState::Conflict { kind }),
        }
    }
}
