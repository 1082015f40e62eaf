use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Inspect and change account privacy & security settings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to a JSON settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Optional path to the local passcode file
    #[arg(long, global = true, value_name = "PATH")]
    pub passcode_path: Option<PathBuf>,

    /// Use an in-process demo account instead of the account service
    #[arg(long, global = true)]
    pub demo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the privacy & security screen once
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show privacy rules
    Privacy {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set, change or remove the cloud password
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
    /// Configure the local passcode
    Passcode {
        #[command(subcommand)]
        command: PasscodeCommands,
    },
    /// Keep the screen mounted and print view changes
    ///
    /// Reads `fg`, `bg` and `quit` from stdin. In demo mode `confirm`
    /// confirms a pending recovery email.
    Watch,
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Set a new cloud password or change the current one
    Edit,
    /// Remove the cloud password or drop an unconfirmed one
    Remove,
}

#[derive(Subcommand)]
pub enum PasscodeCommands {
    /// Turn the local passcode on
    Enable,
    /// Turn the local passcode off
    Disable,
    /// Set the auto-lock delay
    AutoLock {
        /// Delay in minutes
        minutes: u32,
    },
}
