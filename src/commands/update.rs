use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ModuleVcsOpts, PassthroughArgs};
use crate::config::descriptor;
use crate::context::ModuleContext;
use crate::exec::Executor;
use crate::logging::Log;
use crate::projection::diff::{diff, remove_orphans};
use crate::projection::{ConflictPolicy, ProjectionMode, ProjectionReport};
use crate::vcs::{Vcs, VcsKind};

use super::{CommandSetup, project_module};

/// Run the update command for one module.
///
/// # Errors
///
/// Returns an error if the module is not checked out, the client fails, or
/// the re-projection aborts.
pub fn run(
    global: &GlobalOpts,
    opts: &ModuleVcsOpts,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<ProjectionReport> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.checked_out(&opts.module)?;
    update_module(
        &ctx,
        setup.workspace.settings.vcs,
        &opts.passthrough.args,
        &setup.policy,
        executor,
        log,
    )
}

/// Run the update command for every checked-out module, in name order.
///
/// Stops at the first module that fails.
///
/// # Errors
///
/// Returns the first module's error, annotated with its name.
pub fn run_all(
    global: &GlobalOpts,
    opts: &PassthroughArgs,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<usize> {
    let setup = CommandSetup::init(global, log)?;
    let modules = setup.workspace.checked_out_modules()?;
    if modules.is_empty() {
        log.info("no modules checked out");
        return Ok(0);
    }

    for module in &modules {
        let ctx = setup.workspace.module(module)?;
        update_module(
            &ctx,
            setup.workspace.settings.vcs,
            &opts.args,
            &setup.policy,
            executor,
            log,
        )
        .with_context(|| format!("update-all stopped at '{module}'"))?;
    }
    log.info(&format!("updated {} module(s)", modules.len()));
    Ok(modules.len())
}

/// Bring one working copy up to date and reconcile the root with the new
/// descriptor.
///
/// Links whose rule lines disappeared from the descriptor are removed before
/// the new rules are projected.
fn update_module(
    ctx: &ModuleContext,
    vcs_kind: VcsKind,
    extra: &[String],
    policy: &ConflictPolicy,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<ProjectionReport> {
    let old_lines = descriptor_lines(ctx, log);

    log.stage(&format!("Updating {}", ctx.module));
    let result = Vcs::new(vcs_kind, executor)
        .update(&ctx.working_copy, extra)
        .with_context(|| format!("update of '{}' failed", ctx.module))?;
    for line in result.stdout.lines() {
        log.debug(line);
    }

    let new_lines = descriptor_lines(ctx, log);
    let removed = diff(&old_lines, &new_lines);
    if !removed.is_empty() {
        log.debug(&format!("{} rule line(s) removed upstream", removed.len()));
        let orphans = remove_orphans(&ctx.root, &removed, log)?;
        if orphans > 0 {
            log.info(&format!("removed {orphans} orphaned link(s)"));
        }
    }

    project_module(ctx, ProjectionMode::Link, policy, log)
}

/// Current descriptor lines; empty when the descriptor cannot be read, so a
/// module that gains or loses its descriptor still updates.
fn descriptor_lines(ctx: &ModuleContext, log: &dyn Log) -> Vec<String> {
    match descriptor::read(&ctx.descriptor) {
        Ok(text) => text.lines().map(ToString::to_string).collect(),
        Err(e) => {
            log.debug(&e.to_string());
            Vec::new()
        }
    }
}
