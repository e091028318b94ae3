//! Dangling-link collection.
use std::path::Path;

use walkdir::WalkDir;

use crate::config::settings::STATE_DIR;
use crate::error::ProjectionError;
use crate::logging::Log;
use crate::resources::link::remove_symlink;

/// Delete every dangling symlink below `root` and return how many were
/// removed.
///
/// Symlinks are never followed, so linked directories are not descended
/// into. The private state directory is skipped: links inside working
/// copies belong to the modules, not to the projection.
///
/// # Errors
///
/// Returns [`ProjectionError::ScanFailure`] if part of the tree cannot be
/// read and [`ProjectionError::RemovalFailure`] if a link cannot be deleted.
pub fn sweep(root: &Path, log: &dyn Log) -> Result<usize, ProjectionError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == STATE_DIR));

    let mut removed = 0;
    for entry in walker {
        let entry = entry.map_err(|e| ProjectionError::ScanFailure {
            path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            source: e.into(),
        })?;

        if !entry.path_is_symlink() || entry.path().exists() {
            continue;
        }

        remove_symlink(entry.path()).map_err(|source| ProjectionError::RemovalFailure {
            target: entry.path().to_path_buf(),
            source,
        })?;
        log.debug(&format!("removed dangling link {}", entry.path().display()));
        removed += 1;
    }
    Ok(removed)
}
