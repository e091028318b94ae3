//! `add` and `delete`: edit a module's descriptor in place, then re-project.
use anyhow::{Context as _, Result, anyhow, bail};

use crate::cli::{AddOpts, DeleteOpts, GlobalOpts};
use crate::config::descriptor::{self, Rule, normalize_rel_path};
use crate::logging::Log;
use crate::projection::ProjectionMode;
use crate::resources::helpers::fs::is_symlink;
use crate::resources::link::remove_symlink;

use super::{CommandSetup, project_module};

/// Append a mapping to the module's descriptor and re-project it.
///
/// # Errors
///
/// Returns an error if the paths are invalid, the descriptor cannot be
/// written, or the projection aborts.
pub fn add(global: &GlobalOpts, opts: &AddOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.checked_out(&opts.module)?;

    let line = format!("{} {}", opts.source, opts.target);
    let rule = match Rule::parse_line(&line) {
        Ok(Some(rule @ Rule::Mapping { .. })) => rule,
        Ok(_) => bail!("'{line}' is not a mapping"),
        Err(reason) => return Err(anyhow!("invalid mapping '{line}': {reason}")),
    };

    descriptor::append_rule(&ctx.descriptor, &rule)?;
    log.info(&format!("{}: added '{rule}'", ctx.module));

    project_module(&ctx, ProjectionMode::Link, &setup.policy, log)?;
    Ok(())
}

/// Remove every mapping with the given target from the module's descriptor,
/// delete the link, and re-project.
///
/// # Errors
///
/// Returns an error if the target is invalid, the descriptor cannot be
/// rewritten, or the projection aborts.
pub fn delete(global: &GlobalOpts, opts: &DeleteOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.checked_out(&opts.module)?;

    let target = normalize_rel_path(&opts.target)
        .map_err(|reason| anyhow!("invalid target '{}': {reason}", opts.target))?;
    let removed = descriptor::remove_target(&ctx.descriptor, &target)?;
    if removed == 0 {
        log.warn(&format!("{}: no mapping targets '{target}'", ctx.module));
        return Ok(());
    }
    log.info(&format!(
        "{}: removed {removed} rule(s) for '{target}'",
        ctx.module
    ));

    let path = ctx.root.join(&target);
    if is_symlink(&path) {
        remove_symlink(&path).with_context(|| format!("cannot remove {}", path.display()))?;
        log.debug(&format!("removed link {}", path.display()));
    }

    project_module(&ctx, ProjectionMode::Link, &setup.policy, log)?;
    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::context::{ModuleContext, Workspace};
    use crate::logging::MemoryLog;
    use std::path::Path;

    fn setup(dir: &Path, descriptor: &str) -> (GlobalOpts, ModuleContext) {
        Settings::default().save(dir).unwrap();
        let ctx = Workspace::load(dir).unwrap().module("core").unwrap();
        std::fs::create_dir_all(ctx.working_copy.join("src")).unwrap();
        std::fs::write(ctx.working_copy.join("src/a.txt"), "a").unwrap();
        std::fs::write(&ctx.descriptor, descriptor).unwrap();
        let global = GlobalOpts {
            force: false,
            root: Some(dir.to_path_buf()),
        };
        (global, ctx)
    }

    #[test]
    fn add_appends_and_projects() {
        let dir = tempfile::tempdir().unwrap();
        let (global, ctx) = setup(dir.path(), "# rules\n");
        let opts = AddOpts {
            module: "core".to_string(),
            source: "src/a.txt".to_string(),
            target: "etc/a.txt/".to_string(),
        };
        add(&global, &opts, &MemoryLog::new()).unwrap();

        let text = std::fs::read_to_string(&ctx.descriptor).unwrap();
        assert_eq!(text, "# rules\nsrc/a.txt etc/a.txt\n");
        assert!(is_symlink(&ctx.root.join("etc/a.txt")));
    }

    #[test]
    fn add_rejects_escaping_target() {
        let dir = tempfile::tempdir().unwrap();
        let (global, ctx) = setup(dir.path(), "");
        let opts = AddOpts {
            module: "core".to_string(),
            source: "src/a.txt".to_string(),
            target: "../outside".to_string(),
        };
        assert!(add(&global, &opts, &MemoryLog::new()).is_err());
        assert_eq!(std::fs::read_to_string(&ctx.descriptor).unwrap(), "");
    }

    #[test]
    fn delete_removes_rule_and_link() {
        let dir = tempfile::tempdir().unwrap();
        let (global, ctx) = setup(dir.path(), "src/a.txt a.txt\n");
        std::os::unix::fs::symlink(ctx.working_copy.join("src/a.txt"), ctx.root.join("a.txt"))
            .unwrap();

        let opts = DeleteOpts {
            module: "core".to_string(),
            target: "./a.txt".to_string(),
        };
        delete(&global, &opts, &MemoryLog::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&ctx.descriptor).unwrap(), "");
        assert!(ctx.root.join("a.txt").symlink_metadata().is_err());
    }

    #[test]
    fn delete_unknown_target_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (global, ctx) = setup(dir.path(), "src/a.txt a.txt\n");
        let log = MemoryLog::new();
        let opts = DeleteOpts {
            module: "core".to_string(),
            target: "b.txt".to_string(),
        };
        delete(&global, &opts, &log).unwrap();

        assert_eq!(log.warnings().len(), 1);
        assert_eq!(
            std::fs::read_to_string(&ctx.descriptor).unwrap(),
            "src/a.txt a.txt\n"
        );
    }
}
