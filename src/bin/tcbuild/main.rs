//! tcbuild CLI - build DWARF test-suite test cases

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use tcbuild::builder::errors::exit_codes;
use tcbuild::util::diagnostic;
use tcbuild::BuildError;

fn main() {
    let cli = Cli::parse();
    let color = commands::use_color(cli.global.no_color);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<BuildError>() {
            Some(err) => {
                diagnostic::emit(&err.to_diagnostic(), color);
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(exit_codes::FAILURE);
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("tcbuild=debug")
    } else {
        EnvFilter::new("tcbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Build(args) => commands::build::execute(global, args),
        Commands::Stage(args) => commands::stage::execute(global, args),
        Commands::Flags(args) => commands::flags::execute(global, args),
        Commands::Clean(args) => commands::clean::execute(global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
