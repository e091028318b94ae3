use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use modlink_cli::cli::{Cli, Command};
use modlink_cli::commands;
use modlink_cli::exec::SystemExecutor;
use modlink_cli::logging::{Logger, init_subscriber};
use modlink_cli::vcs::Passthrough;

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::Version => {
            let version = option_env!("MODLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("modlink {version}");
            return Ok(());
        }
        Command::Completions(opts) => {
            clap_complete::generate(
                opts.shell,
                &mut Cli::command(),
                "modlink",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        _ => {}
    }

    let name = args.command.name();
    init_subscriber(args.verbose, name);
    let log = Logger::new();
    let executor = SystemExecutor;
    let global = &args.global;

    let result = match &args.command {
        Command::Init(opts) => commands::init::run(global, opts, &log),
        Command::Checkout(opts) => commands::checkout::run(global, opts, &executor, &log).map(drop),
        Command::Export(opts) => commands::checkout::export(global, opts, &executor, &log).map(drop),
        Command::Update(opts) => commands::update::run(global, opts, &executor, &log).map(drop),
        Command::UpdateAll(opts) => commands::update::run_all(global, opts, &executor, &log).map(drop),
        Command::Add(opts) => commands::edit::add(global, opts, &log),
        Command::Delete(opts) => commands::edit::delete(global, opts, &log),
        Command::Status(opts) => {
            commands::passthrough::run(global, opts, Passthrough::Status, &executor, &log)
        }
        Command::Diff(opts) => {
            commands::passthrough::run(global, opts, Passthrough::Diff, &executor, &log)
        }
        Command::Commit(opts) => {
            commands::passthrough::run(global, opts, Passthrough::Commit, &executor, &log)
        }
        Command::Info(opts) => {
            commands::passthrough::run(global, opts, Passthrough::Info, &executor, &log)
        }
        Command::List(opts) => commands::list::run(global, opts, &log),
        Command::Completions(_) | Command::Version => Ok(()),
    };

    log.print_summary();
    result
}
