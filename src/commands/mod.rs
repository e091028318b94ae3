pub mod checkout;
pub mod edit;
pub mod init;
pub mod list;
pub mod passthrough;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::resolve;
use crate::context::{ModuleContext, Workspace};
use crate::logging::Log;
use crate::projection::{self, ConflictPolicy, ProjectionMode, ProjectionReport, sweep::sweep};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution and settings loading so that each command
/// does not have to repeat the boilerplate.
#[derive(Debug, Clone)]
pub struct CommandSetup {
    /// Initialized root and its settings.
    pub workspace: Workspace,
    /// Conflict policy derived from `--force`.
    pub policy: ConflictPolicy,
}

impl CommandSetup {
    /// Resolve the root and load its settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or is not initialized.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));
        let workspace = Workspace::load(&root)?;
        log.debug(&format!(
            "vcs: {}, descriptor: {}",
            workspace.settings.vcs, workspace.settings.descriptor
        ));
        let policy = ConflictPolicy::new(global.force);
        if policy.is_forced() {
            log.debug("force: conflicting entries will be replaced");
        }
        Ok(Self { workspace, policy })
    }

    /// Context for `module`, failing unless it is checked out.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or a missing working copy.
    pub fn checked_out(&self, module: &str) -> Result<ModuleContext> {
        let ctx = self.workspace.module(module)?;
        ctx.require_checked_out()?;
        Ok(ctx)
    }
}

/// Determine the projection root: `--root` (or `MODLINK_ROOT`), else the
/// current directory.
///
/// # Errors
///
/// Returns an error if the directory does not exist or the current
/// directory cannot be read.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    dunce::canonicalize(&root).with_context(|| format!("root {} does not exist", root.display()))
}

/// Resolve `ctx`'s descriptor and project it onto the root, then clear
/// dangling links when projecting as links.
///
/// # Errors
///
/// Returns an error if the descriptor cannot be resolved or the projection
/// aborts.
pub fn project_module(
    ctx: &ModuleContext,
    mode: ProjectionMode,
    policy: &ConflictPolicy,
    log: &dyn Log,
) -> Result<ProjectionReport> {
    log.stage(&format!("Projecting {}", ctx.module));
    let rules =
        resolve(&ctx.descriptor).with_context(|| format!("module '{}'", ctx.module))?;
    log.debug(&format!(
        "{} rule(s) from {}",
        rules.len(),
        ctx.descriptor.display()
    ));

    let report = projection::project(&rules, &ctx.root, mode, policy, log)
        .with_context(|| format!("module '{}'", ctx.module))?;
    log.counts(&ctx.module, &report.counts());
    log.debug(&format!(
        "{} of {} rule(s) projected",
        report.projected(),
        rules.len()
    ));

    if mode == ProjectionMode::Link {
        let swept = sweep(&ctx.root, log)?;
        if swept > 0 {
            log.counts(&ctx.module, &[("swept", swept)]);
        }
    }
    Ok(report)
}
