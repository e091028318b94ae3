//! Descriptor line diffing and orphan removal after an update.
use std::collections::HashSet;
use std::path::Path;

use crate::config::descriptor::{Rule, is_rule_line};
use crate::error::ProjectionError;
use crate::logging::Log;
use crate::resources::helpers::fs::is_symlink;
use crate::resources::link::remove_symlink;

/// Rule lines present in `old` but absent from `new`, in `old` order.
///
/// Membership is by exact line text; comment and blank lines are ignored
/// on both sides.
///
/// # Examples
///
/// ```
/// use modlink_cli::projection::diff::diff;
///
/// let removed = diff(&["a b", "# note", "c d"], &["c d", "e f"]);
/// assert_eq!(removed, vec!["a b"]);
/// ```
#[must_use]
pub fn diff<S: AsRef<str>>(old: &[S], new: &[S]) -> Vec<String> {
    let current: HashSet<&str> = new
        .iter()
        .map(AsRef::as_ref)
        .filter(|l| is_rule_line(l))
        .collect();

    old.iter()
        .map(AsRef::as_ref)
        .filter(|l| is_rule_line(l) && !current.contains(l))
        .map(ToString::to_string)
        .collect()
}

/// Delete the links left behind by `removed` rule lines and return how many
/// were deleted.
///
/// Only symlinks are touched; a real file at an orphaned target is left
/// alone. Lines that are not mappings (imports or unparsable text) are
/// skipped.
///
/// # Errors
///
/// Returns [`ProjectionError::RemovalFailure`] if a link cannot be deleted.
pub fn remove_orphans(
    root: &Path,
    removed: &[String],
    log: &dyn Log,
) -> Result<usize, ProjectionError> {
    let mut count = 0;
    for line in removed {
        let target = match Rule::parse_line(line) {
            Ok(Some(Rule::Mapping { target, .. })) => target,
            Ok(_) => {
                log.debug(&format!("removed line is not a mapping: {line}"));
                continue;
            }
            Err(reason) => {
                log.debug(&format!("skipping unparsable removed line '{line}': {reason}"));
                continue;
            }
        };

        let path = root.join(&target);
        if !is_symlink(&path) {
            continue;
        }
        remove_symlink(&path).map_err(|source| ProjectionError::RemovalFailure {
            target: path.clone(),
            source,
        })?;
        log.info(&format!("removed orphaned link {target}"));
        count += 1;
    }
    Ok(count)
}
