//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::capital::CapitalCommand;
use crate::commands::etoro::EtoroCommand;

/// Command-line client for the Capital.com and eToro trading APIs.
#[derive(Parser, Debug)]
#[command(name = "bourse")]
#[command(author, version = env!("BOURSE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capital.com operations
    Capital(CapitalCommand),

    /// eToro operations
    Etoro(EtoroCommand),
}
