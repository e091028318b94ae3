//! What to do when a target is occupied by something that is not ours.
use crate::resources::EntryKind;

/// Outcome of consulting the policy for one conflicting target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Remove the existing entry and project over it.
    Proceed,
    /// Stop the projection run.
    Abort,
}

/// Decide a single conflict.
///
/// The kind of the existing entry is reported to the user but does not
/// change the outcome: only `force` does.
#[must_use]
pub const fn resolve(_existing: EntryKind, force: bool) -> Decision {
    if force {
        Decision::Proceed
    } else {
        Decision::Abort
    }
}

/// Conflict policy for one invocation.
///
/// Evaluated once per conflicting target; earlier decisions never carry
/// over to later targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    force: bool,
}

impl ConflictPolicy {
    /// Policy that aborts on every conflict unless `force` is set.
    #[must_use]
    pub const fn new(force: bool) -> Self {
        Self { force }
    }

    /// Whether conflicting entries are replaced.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.force
    }

    /// Decide the conflict for an existing entry of `kind`.
    #[must_use]
    pub const fn resolve(&self, kind: EntryKind) -> Decision {
        resolve(kind, self.force)
    }
}
