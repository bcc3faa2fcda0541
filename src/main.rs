use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::sync::Arc;

use goot::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();

    // A bare invocation shows the same help as `--help`.
    let args = if std::env::args_os().len() <= 1 {
        let bin = std::env::args_os()
            .next()
            .unwrap_or_else(|| OsString::from("goot"));
        cli::Cli::parse_from([bin, OsString::from("--help")])
    } else {
        cli::Cli::parse()
    };

    let command = &args.command;
    let start_logging = || {
        let log_file =
            logging::init_subscriber(args.verbose, command.log_name(), command.dry_run());
        Arc::new(logging::Logger::new(log_file))
    };

    match command {
        cli::Command::Ensure(opts) => commands::ensure::run(opts, &start_logging()),
        cli::Command::Update(opts) => commands::update::run(opts, &start_logging()),
        cli::Command::Add(opts) => commands::add::run(opts, &start_logging()),
        cli::Command::Dump(opts) => commands::dump::run(opts, &start_logging()),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
