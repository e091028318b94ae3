use anyhow::{Result, bail};

use crate::cli::{GlobalOpts, InitOpts};
use crate::config::Settings;
use crate::config::settings::DEFAULT_DESCRIPTOR;
use crate::error::ConfigError;
use crate::logging::Log;

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the root is already initialized (without `--force`),
/// the descriptor name is not a plain file name, or the settings cannot be
/// written.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &dyn Log) -> Result<()> {
    let root = super::resolve_root(global)?;
    log.stage(&format!("Initializing {}", root.display()));

    if Settings::path(&root).exists() && !global.force {
        return Err(ConfigError::AlreadyInitialized { root }.into());
    }

    let descriptor = opts
        .descriptor
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTOR.to_string());
    if descriptor.is_empty() || descriptor.contains(['/', '\\']) || descriptor == ".." {
        bail!("descriptor name '{descriptor}' must be a plain file name");
    }

    let settings = Settings {
        repository: opts
            .repository
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string()),
        vcs: opts.vcs,
        descriptor,
    };
    settings.save(&root)?;

    log.info(&format!(
        "wrote {} (vcs: {}, descriptor: {})",
        Settings::path(&root).display(),
        settings.vcs,
        settings.descriptor
    ));
    if let Some(repository) = &settings.repository {
        log.info(&format!("repository: {repository}"));
    }
    Ok(())
}
