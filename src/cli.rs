use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::vcs::VcsKind;

/// Top-level CLI entry point for the module projection manager.
#[derive(Parser, Debug)]
#[command(
    name = "modlink",
    about = "Project version-controlled modules onto a directory tree",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Replace conflicting files and directories instead of aborting
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Projection root (defaults to the current directory)
    #[arg(long, global = true, env = "MODLINK_ROOT")]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the state directory and settings in the root
    Init(InitOpts),
    /// Check out a module and project it as links
    Checkout(CheckoutOpts),
    /// Check out a module into a throwaway directory and project it as copies
    Export(CheckoutOpts),
    /// Update a module and re-project it
    Update(ModuleVcsOpts),
    /// Update every checked-out module
    UpdateAll(PassthroughArgs),
    /// Append a mapping to a module's descriptor and re-project
    Add(AddOpts),
    /// Remove every mapping with a target from a module's descriptor
    Delete(DeleteOpts),
    /// Show the working-copy status of a module
    Status(ModuleVcsOpts),
    /// Show local changes in a module
    Diff(ModuleVcsOpts),
    /// Commit local changes in a module
    Commit(ModuleVcsOpts),
    /// Show working-copy information for a module
    Info(ModuleVcsOpts),
    /// Print a module's descriptor
    List(ModuleOpts),
    /// Print shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used to name the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Checkout(_) => "checkout",
            Self::Export(_) => "export",
            Self::Update(_) => "update",
            Self::UpdateAll(_) => "update-all",
            Self::Add(_) => "add",
            Self::Delete(_) => "delete",
            Self::Status(_) => "status",
            Self::Diff(_) => "diff",
            Self::Commit(_) => "commit",
            Self::Info(_) => "info",
            Self::List(_) => "list",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InitOpts {
    /// Base URL that module names are appended to
    #[arg(long)]
    pub repository: Option<String>,

    /// Version-control client owning the working copies
    #[arg(long, value_enum, default_value_t = VcsKind::Svn)]
    pub vcs: VcsKind,

    /// Descriptor file name inside each module
    #[arg(long)]
    pub descriptor: Option<String>,
}

/// Extra arguments forwarded to the version-control client after `--`.
#[derive(Args, Debug, Clone, Default)]
pub struct PassthroughArgs {
    /// Arguments passed to the client verbatim
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Options for `checkout` and `export`.
#[derive(Args, Debug, Clone)]
pub struct CheckoutOpts {
    /// Module name
    pub module: String,

    /// Repository URL (defaults to `<repository>/<module>`)
    #[arg(long)]
    pub url: Option<String>,

    #[command(flatten)]
    pub passthrough: PassthroughArgs,
}

/// Options for commands that act on one module through the client.
#[derive(Args, Debug, Clone)]
pub struct ModuleVcsOpts {
    /// Module name
    pub module: String,

    #[command(flatten)]
    pub passthrough: PassthroughArgs,
}

/// Options for commands that take only a module.
#[derive(Args, Debug, Clone)]
pub struct ModuleOpts {
    /// Module name
    pub module: String,
}

/// Options for the `add` subcommand.
#[derive(Args, Debug, Clone)]
pub struct AddOpts {
    /// Module name
    pub module: String,
    /// Source path inside the module
    pub source: String,
    /// Target path under the root
    pub target: String,
}

/// Options for the `delete` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DeleteOpts {
    /// Module name
    pub module: String,
    /// Target path under the root
    pub target: String,
}

/// Options for the `completions` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_listing() {
        let names: Vec<String> = Cli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .filter(|name| name != "help")
            .collect();
        insta::assert_snapshot!(names.join("\n"), @r"
        init
        checkout
        export
        update
        update-all
        add
        delete
        status
        diff
        commit
        info
        list
        completions
        version
        ");
    }

    #[test]
    fn parse_checkout_with_url_and_passthrough() {
        let cli = Cli::parse_from([
            "modlink",
            "checkout",
            "core",
            "--url",
            "https://svn.example.org/core",
            "--",
            "--depth",
            "empty",
        ]);
        assert!(matches!(
            &cli.command,
            Command::Checkout(opts)
                if opts.module == "core"
                    && opts.url.as_deref() == Some("https://svn.example.org/core")
                    && opts.passthrough.args == ["--depth", "empty"]
        ));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["modlink", "update", "core", "-f", "-v", "--root", "/srv"]);
        assert!(cli.verbose);
        assert!(cli.global.force);
        assert_eq!(cli.global.root, Some(PathBuf::from("/srv")));
        assert_eq!(cli.command.name(), "update");
    }

    #[test]
    fn parse_init_defaults() {
        let cli = Cli::parse_from(["modlink", "init"]);
        assert!(matches!(
            cli.command,
            Command::Init(InitOpts {
                vcs: VcsKind::Svn,
                repository: None,
                descriptor: None,
            })
        ));
    }

    #[test]
    fn parse_init_git() {
        let cli = Cli::parse_from(["modlink", "init", "--vcs", "git", "--repository", "u"]);
        assert!(matches!(
            &cli.command,
            Command::Init(opts) if opts.vcs == VcsKind::Git && opts.repository.as_deref() == Some("u")
        ));
    }

    #[test]
    fn parse_add() {
        let cli = Cli::parse_from(["modlink", "add", "core", "src/a", "a"]);
        assert!(matches!(
            &cli.command,
            Command::Add(opts) if opts.module == "core" && opts.source == "src/a" && opts.target == "a"
        ));
    }

    #[test]
    fn parse_update_all_name() {
        let cli = Cli::parse_from(["modlink", "update-all"]);
        assert_eq!(cli.command.name(), "update-all");
    }

    #[test]
    fn add_requires_target() {
        assert!(Cli::try_parse_from(["modlink", "add", "core", "src/a"]).is_err());
    }
}
