//! File-system helpers for projection entries.
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Whether `path` itself is a symlink (dangling or not).
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink())
}

/// Remove whatever lives at `path` without following symlinks: links and
/// files are unlinked, real directories are removed recursively.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    if meta.file_type().is_symlink() {
        super::super::link::remove_symlink(path)
    } else if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Recursively reproduce `src` at `dst` using hard links.
///
/// Files become hard links to the originals, directories are created, and
/// symlinks inside the tree are recreated with the same link text. A file
/// `src` yields a single hard link.
///
/// # Errors
///
/// Returns an error if any directory, link, or hard link cannot be created.
pub fn hardlink_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if !src.is_dir() {
        return std::fs::hard_link(src, dst);
    }

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let out = dst.join(rel);
        let ft = entry.file_type();

        if ft.is_dir() {
            std::fs::create_dir_all(&out)?;
        } else if ft.is_symlink() {
            let link_text = std::fs::read_link(entry.path())?;
            super::super::link::create_symlink(&link_text, &out)?;
        } else {
            std::fs::hard_link(entry.path(), &out)?;
        }
    }
    Ok(())
}

/// Whether `dst` is a complete hard-linked reproduction of `src`.
///
/// Every file below `src` must share its inode with the counterpart in
/// `dst`, every directory must exist as a real directory, and every symlink
/// must carry the same link text. Extra entries in `dst` are ignored.
#[must_use]
pub fn is_hardlinked_copy(src: &Path, dst: &Path) -> bool {
    if is_symlink(dst) {
        return false;
    }
    if !src.is_dir() {
        return same_file(src, dst);
    }
    if !dst.is_dir() {
        return false;
    }

    WalkDir::new(src).follow_links(false).into_iter().all(|entry| {
        let Ok(entry) = entry else {
            return false;
        };
        let Ok(rel) = entry.path().strip_prefix(src) else {
            return false;
        };
        let out = dst.join(rel);
        let ft = entry.file_type();

        if ft.is_dir() {
            !is_symlink(&out) && out.is_dir()
        } else if ft.is_symlink() {
            is_symlink(&out)
                && std::fs::read_link(&out).ok() == std::fs::read_link(entry.path()).ok()
        } else {
            same_file(entry.path(), &out)
        }
    })
}

/// Whether `a` and `b` are the same inode (i.e. hard links of each other).
#[cfg(unix)]
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (std::fs::symlink_metadata(a), std::fs::symlink_metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

/// Whether `a` and `b` are the same file.
///
/// Without inode numbers a hard link cannot be told apart from an
/// independent copy, so this is always `false`.
#[cfg(not(unix))]
#[must_use]
pub const fn same_file(_a: &Path, _b: &Path) -> bool {
    false
}
