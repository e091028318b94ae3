use anyhow::{Context as _, Result};

use crate::cli::{CheckoutOpts, GlobalOpts};
use crate::context::{ModuleContext, Workspace};
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::projection::{ProjectionMode, ProjectionReport};
use crate::vcs::Vcs;

use super::{CommandSetup, project_module};

/// Run the checkout command: fetch the module and project it as links.
///
/// Re-running against an existing working copy skips the fetch and only
/// re-projects, so a run aborted by a conflict can be repeated once the
/// obstacle is gone. A working copy without a descriptor is treated as an
/// interrupted checkout and fetched again.
///
/// # Errors
///
/// Returns an error if no URL can be determined, the client fails, or the
/// projection aborts.
pub fn run(
    global: &GlobalOpts,
    opts: &CheckoutOpts,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<ProjectionReport> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.workspace.module(&opts.module)?;

    if ctx.is_checked_out() && ctx.descriptor.is_file() {
        log.info(&format!(
            "{} is already checked out, re-projecting (use `modlink update` to fetch changes)",
            ctx.module
        ));
    } else {
        if ctx.is_checked_out() {
            log.warn(&format!(
                "{}: working copy has no descriptor, checking out again",
                ctx.module
            ));
            std::fs::remove_dir_all(&ctx.working_copy)
                .with_context(|| format!("cannot remove {}", ctx.working_copy.display()))?;
        }
        fetch(&setup.workspace, &ctx, opts, executor, log)?;
    }

    project_module(&ctx, ProjectionMode::Link, &setup.policy, log)
}

/// Run the export command: fetch the module into a transient directory,
/// project it as hardlinked copies, then discard the checkout.
///
/// # Errors
///
/// Returns an error if no URL can be determined, the client fails, or the
/// projection aborts. The transient checkout is removed in every case.
pub fn export(
    global: &GlobalOpts,
    opts: &CheckoutOpts,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<ProjectionReport> {
    let setup = CommandSetup::init(global, log)?;
    let state_dir = setup.workspace.state_dir();
    let tmp = tempfile::Builder::new()
        .prefix("export-")
        .tempdir_in(&state_dir)
        .with_context(|| format!("cannot create export directory in {}", state_dir.display()))?;

    let ctx = setup
        .workspace
        .module(&opts.module)?
        .relocated(&tmp.path().join(&opts.module));
    log.debug(&format!("export checkout: {}", ctx.working_copy.display()));

    let report = fetch(&setup.workspace, &ctx, opts, executor, log)
        .and_then(|()| project_module(&ctx, ProjectionMode::Copy, &setup.policy, log));

    let tmp_path = tmp.path().to_path_buf();
    tmp.close()
        .with_context(|| format!("cannot remove {}", tmp_path.display()))?;
    report
}

/// Repository URL for `module`: the explicit `--url`, else the configured
/// repository with the module name appended.
fn module_url(workspace: &Workspace, opts: &CheckoutOpts) -> Result<String, ConfigError> {
    if let Some(url) = &opts.url {
        return Ok(url.clone());
    }
    workspace
        .settings
        .repository
        .as_deref()
        .map(|base| format!("{}/{}", base.trim_end_matches('/'), opts.module))
        .ok_or_else(|| ConfigError::MissingRepository(opts.module.clone()))
}

fn fetch(
    workspace: &Workspace,
    ctx: &ModuleContext,
    opts: &CheckoutOpts,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<()> {
    let url = module_url(workspace, opts)?;
    log.stage(&format!("Checking out {} from {url}", ctx.module));

    if let Some(parent) = ctx.working_copy.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    let vcs = Vcs::new(workspace.settings.vcs, executor);
    log.debug(&format!(
        "{} into {}",
        vcs.kind(),
        ctx.working_copy.display()
    ));
    let result = vcs
        .checkout(&url, &ctx.working_copy, &opts.passthrough.args)
        .with_context(|| format!("checkout of '{}' failed", ctx.module))?;
    for line in result.stdout.lines() {
        log.debug(line);
    }
    Ok(())
}
