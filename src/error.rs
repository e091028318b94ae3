//! Domain-specific error types for the projection engine.
//!
//! Internal modules return typed errors (e.g., [`DescriptorError`],
//! [`ProjectionError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ModlinkError
//! ├── Config(ConfigError)         - settings, workspace layout, module names
//! ├── Descriptor(DescriptorError) - descriptor parsing and import resolution
//! ├── Projection(ProjectionError) - conflicts, link/copy creation
//! └── Vcs(VcsError)               - delegated version-control commands
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::resources::EntryKind;

/// Top-level error type for the projection engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum ModlinkError {
    /// Settings or workspace layout error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Descriptor could not be read, parsed, or resolved.
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Projection run aborted.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Delegated VCS command failed.
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),
}

/// Errors that arise from settings and workspace layout.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The root has no `.modlink/config.toml`.
    #[error("{root} is not a modlink root (run `modlink init` first)")]
    NotInitialized {
        /// Root that was searched.
        root: PathBuf,
    },

    /// `init` was run against a root that already has settings.
    #[error("{root} is already initialized (use --force to overwrite)")]
    AlreadyInitialized {
        /// Root that already carries settings.
        root: PathBuf,
    },

    /// The settings file contains invalid TOML.
    #[error("Invalid settings in {file}: {message}")]
    InvalidSyntax {
        /// Settings file path.
        file: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading or writing settings.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A module name is empty or would escape the working-copy directory.
    #[error("Invalid module name '{0}'")]
    InvalidModuleName(String),

    /// The module has no working copy under the root.
    #[error("Module '{0}' is not checked out")]
    ModuleNotCheckedOut(String),

    /// No repository URL is configured and none was given.
    #[error("No repository URL configured for module '{0}' (pass --url or set `repository`)")]
    MissingRepository(String),
}

/// Errors that arise from reading, parsing, and resolving descriptors.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The descriptor file is missing or unreadable.
    #[error("cannot read descriptor {path}: {source}")]
    Unreadable {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The descriptor could not be rewritten by `add` or `delete`.
    #[error("cannot write descriptor {path}: {source}")]
    Unwritable {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A descriptor line is not a valid rule.
    #[error("{path}:{line}: {reason}")]
    Malformed {
        /// Descriptor path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// An `@import` names a module with no readable descriptor.
    #[error("import '{import}' not found: {path} is not readable")]
    ImportNotFound {
        /// Import path as declared in the descriptor.
        import: String,
        /// Descriptor path that was expected.
        path: PathBuf,
    },

    /// An import chain revisits a module already being resolved.
    #[error("import cycle: {chain}")]
    ImportCycle {
        /// The chain of module directories, joined with `→`.
        chain: String,
    },

    /// A nested resolution failed below the given import.
    #[error("in import '{import}': {source}")]
    InImport {
        /// Import path as declared in the descriptor.
        import: String,
        /// Error raised while resolving the imported descriptor.
        source: Box<DescriptorError>,
    },
}

/// Errors that abort a projection run.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// An existing entry that is not a projection blocks the target.
    #[error("conflict at {target}: existing {kind} is not a projection (use --force to replace)")]
    Conflict {
        /// Target path under the root.
        target: PathBuf,
        /// Kind of the existing entry.
        kind: EntryKind,
    },

    /// Creating a link or copy failed at the filesystem level.
    #[error("cannot project '{rule}' to {target}: {source}")]
    CreationFailure {
        /// Rule in descriptor form.
        rule: String,
        /// Target path under the root.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Walking the root for stale links failed.
    #[error("cannot scan {path}: {source}")]
    ScanFailure {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Removing an existing entry failed.
    #[error("cannot remove {target}: {source}")]
    RemovalFailure {
        /// Path that could not be removed.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from delegated VCS commands.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The VCS client exited non-zero.
    #[error("'{program} {args}' failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        /// VCS program.
        program: String,
        /// Arguments, space-joined.
        args: String,
        /// Exit code, `-1` when killed by a signal.
        exit_code: i32,
        /// Captured standard error (empty when stdio was inherited).
        stderr: String,
    },

    /// The VCS client could not be started.
    #[error("failed to execute '{program}': {source}")]
    Spawn {
        /// VCS program.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The VCS client is not on `PATH`.
    #[error("'{program}' not found on PATH")]
    NotFound {
        /// VCS program.
        program: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // DescriptorError
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_display_has_location() {
        let e = DescriptorError::Malformed {
            path: PathBuf::from("/wc/modlink.map"),
            line: 3,
            reason: "expected 2 fields, found 1".to_string(),
        };
        assert_eq!(e.to_string(), "/wc/modlink.map:3: expected 2 fields, found 1");
    }

    #[test]
    fn in_import_display_chains_source() {
        let inner = DescriptorError::ImportNotFound {
            import: "lib/core".to_string(),
            path: PathBuf::from("/wc/lib/core/modlink.map"),
        };
        let e = DescriptorError::InImport {
            import: "lib".to_string(),
            source: Box::new(inner),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("in import 'lib': import 'lib/core' not found"));
    }

    #[test]
    fn unreadable_has_source() {
        use std::error::Error as StdError;
        let e = DescriptorError::Unreadable {
            path: PathBuf::from("/wc/modlink.map"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
    }

    // -----------------------------------------------------------------------
    // ProjectionError
    // -----------------------------------------------------------------------

    #[test]
    fn conflict_display_mentions_force() {
        let e = ProjectionError::Conflict {
            target: PathBuf::from("/root/target.txt"),
            kind: EntryKind::File,
        };
        assert_eq!(
            e.to_string(),
            "conflict at /root/target.txt: existing file is not a projection (use --force to replace)"
        );
    }

    #[test]
    fn creation_failure_names_rule() {
        let e = ProjectionError::CreationFailure {
            rule: "src/a.txt a.txt".to_string(),
            target: PathBuf::from("/root/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("'src/a.txt a.txt'"));
    }

    // -----------------------------------------------------------------------
    // VcsError
    // -----------------------------------------------------------------------

    #[test]
    fn command_failed_display() {
        let e = VcsError::CommandFailed {
            program: "svn".to_string(),
            args: "update".to_string(),
            exit_code: 1,
            stderr: "E155007: not a working copy".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "'svn update' failed (exit 1): E155007: not a working copy"
        );
    }

    // -----------------------------------------------------------------------
    // ModlinkError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn modlink_error_from_descriptor_error() {
        let e: ModlinkError = DescriptorError::ImportCycle {
            chain: "a → b → a".to_string(),
        }
        .into();
        assert!(e.to_string().contains("Descriptor error"));
        assert!(e.to_string().contains("a → b → a"));
    }

    #[test]
    fn modlink_error_from_config_error() {
        let e: ModlinkError = ConfigError::ModuleNotCheckedOut("core".to_string()).into();
        assert!(e.to_string().contains("Configuration error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ModlinkError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<DescriptorError>();
        assert_send_sync::<ProjectionError>();
        assert_send_sync::<VcsError>();
    }

    #[test]
    fn projection_error_converts_to_anyhow() {
        let e = ProjectionError::Conflict {
            target: PathBuf::from("x"),
            kind: EntryKind::Directory,
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
