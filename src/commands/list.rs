use anyhow::Result;

use crate::cli::{GlobalOpts, ModuleOpts};
use crate::config::descriptor;
use crate::logging::Log;

use super::CommandSetup;

/// Raw descriptor text of a checked-out module.
///
/// # Errors
///
/// Returns an error if the module is not checked out or its descriptor
/// cannot be read.
pub fn descriptor_text(global: &GlobalOpts, opts: &ModuleOpts, log: &dyn Log) -> Result<String> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.checked_out(&opts.module)?;
    log.debug(&format!("reading {}", ctx.descriptor.display()));
    Ok(descriptor::read(&ctx.descriptor)?)
}

/// Run the list command: print the module's descriptor unchanged.
///
/// # Errors
///
/// See [`descriptor_text`].
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ModuleOpts, log: &dyn Log) -> Result<()> {
    let text = descriptor_text(global, opts, log)?;
    print!("{text}");
    Ok(())
}
