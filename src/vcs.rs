//! Version-control delegation.
//!
//! Working copies are owned by an external client (`svn` or `git`); this
//! module only maps each operation to that client's command line and runs it
//! through an [`Executor`].
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VcsError;
use crate::exec::{ExecResult, Executor};

/// Which version-control client owns the working copies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// Subversion.
    #[default]
    Svn,
    /// Git.
    Git,
}

impl VcsKind {
    /// Client executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Svn => "svn",
            Self::Git => "git",
        }
    }

    /// Subcommand that creates a working copy from a URL.
    const fn checkout_args(self) -> &'static [&'static str] {
        match self {
            Self::Svn => &["checkout"],
            Self::Git => &["clone"],
        }
    }

    /// Subcommand that brings a working copy up to date.
    const fn update_args(self) -> &'static [&'static str] {
        match self {
            Self::Svn => &["update"],
            Self::Git => &["pull", "--ff-only"],
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Operations forwarded verbatim to the client with the terminal attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passthrough {
    /// Show working-copy status.
    Status,
    /// Show local changes.
    Diff,
    /// Commit local changes.
    Commit,
    /// Show working-copy information.
    Info,
}

impl Passthrough {
    fn args(self, kind: VcsKind) -> &'static [&'static str] {
        match (self, kind) {
            (Self::Status, _) => &["status"],
            (Self::Diff, _) => &["diff"],
            (Self::Commit, _) => &["commit"],
            (Self::Info, VcsKind::Svn) => &["info"],
            (Self::Info, VcsKind::Git) => &["log", "-1", "--stat"],
        }
    }
}

/// A VCS client bound to an executor.
#[derive(Debug, Clone, Copy)]
pub struct Vcs<'a> {
    kind: VcsKind,
    executor: &'a dyn Executor,
}

impl<'a> Vcs<'a> {
    /// Bind `kind` to `executor`.
    #[must_use]
    pub const fn new(kind: VcsKind, executor: &'a dyn Executor) -> Self {
        Self { kind, executor }
    }

    /// Which client this is.
    #[must_use]
    pub const fn kind(&self) -> VcsKind {
        self.kind
    }

    /// Fail early when the client binary is not on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::NotFound`].
    pub fn ensure_available(&self) -> Result<(), VcsError> {
        let program = self.kind.program();
        if self.executor.which(program) {
            Ok(())
        } else {
            Err(VcsError::NotFound {
                program: program.to_string(),
            })
        }
    }

    /// Check `url` out into `dest`. The parent of `dest` must exist.
    ///
    /// # Errors
    ///
    /// Returns a [`VcsError`] if the client is missing or fails.
    pub fn checkout(&self, url: &str, dest: &Path, extra: &[String]) -> Result<ExecResult, VcsError> {
        self.ensure_available()?;
        let dest_str = dest.to_string_lossy();
        let mut args: Vec<&str> = self.kind.checkout_args().to_vec();
        args.extend(extra.iter().map(String::as_str));
        args.push(url);
        args.push(&dest_str);
        let cwd = dest.parent().unwrap_or(dest);
        self.executor.run_in(cwd, self.kind.program(), &args)
    }

    /// Update the working copy at `working_copy`.
    ///
    /// # Errors
    ///
    /// Returns a [`VcsError`] if the client is missing or fails.
    pub fn update(&self, working_copy: &Path, extra: &[String]) -> Result<ExecResult, VcsError> {
        self.ensure_available()?;
        let mut args: Vec<&str> = self.kind.update_args().to_vec();
        args.extend(extra.iter().map(String::as_str));
        self.executor
            .run_in(working_copy, self.kind.program(), &args)
    }

    /// Run a passthrough operation in `working_copy`.
    ///
    /// # Errors
    ///
    /// Returns a [`VcsError`] if the client is missing or fails.
    pub fn passthrough(
        &self,
        op: Passthrough,
        working_copy: &Path,
        extra: &[String],
    ) -> Result<(), VcsError> {
        self.ensure_available()?;
        let mut args: Vec<&str> = op.args(self.kind).to_vec();
        args.extend(extra.iter().map(String::as_str));
        self.executor
            .run_passthrough(working_copy, self.kind.program(), &args)
    }
}
