//! `mimir-state` binary entry point.
use anyhow::Result;
use clap::Parser;

use mimir_state::exec::SystemExecutor;
use mimir_state::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new();

    match args.command {
        cli::Command::Plan(opts) => commands::plan::run(&args.global, &opts, &log),
        cli::Command::Check => commands::check::run(&args.global, &log),
        cli::Command::Render(opts) => {
            commands::render::run(&args.global, &opts, &log, &SystemExecutor)
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
