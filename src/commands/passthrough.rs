use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ModuleVcsOpts};
use crate::exec::Executor;
use crate::logging::Log;
use crate::vcs::{Passthrough, Vcs};

use super::CommandSetup;

/// Run `op` in the module's working copy with the terminal attached.
///
/// # Errors
///
/// Returns an error if the module is not checked out or the client fails.
pub fn run(
    global: &GlobalOpts,
    opts: &ModuleVcsOpts,
    op: Passthrough,
    executor: &dyn Executor,
    log: &dyn Log,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.checked_out(&opts.module)?;
    log.debug(&format!(
        "{op:?} in {}",
        ctx.working_copy.display()
    ));

    Vcs::new(setup.workspace.settings.vcs, executor)
        .passthrough(op, &ctx.working_copy, &opts.passthrough.args)
        .with_context(|| format!("module '{}'", ctx.module))
}
