//! Projection of resolved rules onto the root.
//!
//! [`project`] turns every mapping into a link (or a hard-linked copy),
//! [`sweep::sweep`] clears dangling links afterwards, and [`diff`] removes
//! links orphaned by a descriptor change.
pub mod conflict;
pub mod diff;
pub mod sweep;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::config::ResolvedRuleSet;
use crate::error::ProjectionError;
use crate::logging::Log;
use crate::resources::copy::CopyResource;
use crate::resources::helpers::fs::remove_entry;
use crate::resources::link::LinkResource;
use crate::resources::{Applicable as _, Resource, ResourceChange, ResourceState};

pub use conflict::{ConflictPolicy, Decision};

/// How entries are materialized under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Symlinks into the working copy.
    Link,
    /// Recursive hard-linked copies that outlive the working copy.
    Copy,
}

/// Counters collected during one projection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    /// Entries created where nothing existed.
    pub created: usize,
    /// Entries that already matched and were left untouched.
    pub already_correct: usize,
    /// Stale links re-pointed or foreign entries replaced under force.
    pub replaced: usize,
    /// Rules skipped because their source does not exist.
    pub missing_source: usize,
    /// Links deleted because their source vanished.
    pub removed: usize,
}

impl ProjectionReport {
    /// Number of rules that produced an entry.
    #[must_use]
    pub const fn projected(&self) -> usize {
        self.created + self.already_correct + self.replaced
    }

    /// The tallies as labelled counters, in [`Display`](fmt::Display) order.
    #[must_use]
    pub const fn counts(&self) -> [(&'static str, usize); 5] {
        [
            ("created", self.created),
            ("unchanged", self.already_correct),
            ("replaced", self.replaced),
            ("missing", self.missing_source),
            ("removed", self.removed),
        ]
    }
}

impl fmt::Display for ProjectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} unchanged, {} replaced, {} missing, {} removed",
            self.created, self.already_correct, self.replaced, self.missing_source, self.removed
        )
    }
}

/// Project every rule of `rules` onto `root`.
///
/// Rules are applied in order. The run stops at the first error; entries
/// created before it stay in place.
///
/// # Errors
///
/// - [`ProjectionError::Conflict`] when a foreign entry blocks a target and
///   `policy` is not forced.
/// - [`ProjectionError::CreationFailure`] when a link or copy cannot be made.
/// - [`ProjectionError::RemovalFailure`] when an entry cannot be cleared.
pub fn project(
    rules: &ResolvedRuleSet,
    root: &Path,
    mode: ProjectionMode,
    policy: &ConflictPolicy,
    log: &dyn Log,
) -> Result<ProjectionReport, ProjectionError> {
    let mut report = ProjectionReport::default();
    let mut seen = HashSet::new();
    // Targets holding an entry produced by this run.
    let mut owned = HashSet::new();

    for rule in rules {
        let source = rule.source_path();
        let target = rule.target_path(root);
        let creation_failure = |e| ProjectionError::CreationFailure {
            rule: rule.to_string(),
            target: target.clone(),
            source: e,
        };
        let removal_failure = |e| ProjectionError::RemovalFailure {
            target: target.clone(),
            source: e,
        };

        // A later rule for the same target wins over one applied earlier in
        // this run; that entry is ours, so the policy is not consulted.
        if !seen.insert(rule.target.as_str()) {
            log.warn(&format!(
                "duplicate target {}: '{rule}' replaces an earlier rule",
                rule.target
            ));
            if owned.contains(rule.target.as_str()) && source.symlink_metadata().is_ok() {
                owned.remove(rule.target.as_str());
                remove_entry(&target).map_err(removal_failure)?;
            }
        }

        let entry: Box<dyn Resource> = match mode {
            ProjectionMode::Link => Box::new(LinkResource::new(source.clone(), target.clone())),
            ProjectionMode::Copy => Box::new(CopyResource::new(source.clone(), target.clone())),
        };

        match entry.current_state().map_err(creation_failure)? {
            ResourceState::Invalid { reason } => {
                report.missing_source += 1;
                // An entry made earlier in this run for the same target stays.
                let unlinked = mode == ProjectionMode::Link
                    && !owned.contains(rule.target.as_str())
                    && entry.remove().map_err(removal_failure)? == ResourceChange::Applied;
                if unlinked {
                    report.removed += 1;
                    log.warn(&format!(
                        "{}: alias no longer present in working copy, link removed",
                        rule.target
                    ));
                } else {
                    log.warn(&format!("skipping '{rule}': {reason}"));
                }
            }
            ResourceState::Correct => {
                report.already_correct += 1;
                log.debug(&format!("ok {}", entry.description()));
            }
            ResourceState::Missing => {
                entry.apply().map_err(creation_failure)?;
                report.created += 1;
                log.debug(&format!("created {}", entry.description()));
            }
            ResourceState::Incorrect { current } => {
                entry.apply().map_err(creation_failure)?;
                report.replaced += 1;
                log.info(&format!("re-pointed {} (was: {current})", rule.target));
            }
            ResourceState::Conflict { kind } => match policy.resolve(kind) {
                Decision::Abort => return Err(ProjectionError::Conflict { target, kind }),
                Decision::Proceed => {
                    remove_entry(&target).map_err(removal_failure)?;
                    entry.apply().map_err(creation_failure)?;
                    report.replaced += 1;
                    log.warn(&format!("replaced existing {kind} at {}", rule.target));
                }
            },
        }

        if target.symlink_metadata().is_ok() && source.symlink_metadata().is_ok() {
            owned.insert(rule.target.as_str());
        }
    }

    Ok(report)
}
