use std::process::ExitCode;

use clap::Parser as _;

use peridot::cli::{Cli, Command};
use peridot::commands::{self, AppContext};
use peridot::logging::{self, Logger};
use peridot::paths;

fn main() -> ExitCode {
    let args = Cli::parse();
    let ctx = AppContext::new();

    // Only attach the file sink to an initialized dotfiles dir; otherwise a
    // stray invocation would scatter `.peridot/` directories around.
    let file_sink = paths::peridot_dir(&ctx.dotfiles_dir)
        .is_dir()
        .then_some(ctx.dotfiles_dir.as_path());
    logging::init_subscriber(args.verbose, file_sink);
    let log = Logger::new();

    let result = match args.command {
        Command::Init(init_args) => commands::init::run(&init_args, &log),
        Command::Add(add_args) => commands::add::run(&ctx, &add_args, &log),
        Command::Deploy(deploy_args) => commands::deploy::run(&ctx, &deploy_args, &log),
        Command::Remove(remove_args) => commands::remove::run(&ctx, &remove_args, &log),
        Command::Status => commands::status::run(&ctx, &log),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // One line: the failing operation and its chain of causes.
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
