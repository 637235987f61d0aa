//! Secure File Manager CLI
//!
//! Reconciles Azure DevOps secure files and their pipeline authorization
//! from TOML manifests.

mod cli;
mod commands;
mod error;
mod ledger;
mod logging;
mod session;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fingerprint { manifest } => commands::run_fingerprint(&manifest),
        Commands::Plan { manifest, label } => {
            commands::run_plan(&cli.state, &manifest, label.as_deref())
        }
        Commands::Apply { manifest, label } => {
            commands::run_apply(&cli.connection, &cli.state, &manifest, label.as_deref())
        }
        Commands::Read { project, id, json } => {
            commands::run_read(&cli.connection, project, id, json)
        }
        Commands::Delete { label } => commands::run_delete(&cli.connection, &cli.state, &label),
    }
}
