//! Veil CLI - privacy & security settings from the command line
//!
//! Shows the settings screen, runs password flows and manages the local
//! passcode against the account service or an in-process demo account.

mod cli;
mod commands;
mod error;
mod prompts;
mod settings;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::Session;
use crate::commands::passcode::run_passcode;
use crate::commands::password::run_password;
use crate::commands::privacy::run_privacy;
use crate::commands::status::run_status;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "veil=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = Session::open(cli.config, cli.passcode_path, cli.demo)?;

    match &cli.command {
        Commands::Status { json } => run_status(&session, *json).await?,
        Commands::Privacy { json } => run_privacy(&session, *json).await?,
        Commands::Password { command } => run_password(&session, command).await?,
        Commands::Passcode { command } => run_passcode(&session, command)?,
        Commands::Watch => run_watch(&session).await?,
    }

    Ok(())
}
