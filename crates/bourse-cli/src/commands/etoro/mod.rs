//! eToro subcommands.

mod account;
mod markets;
mod positions;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bourse_etoro::config::env;
use bourse_etoro::{EtoroClient, EtoroConfig};

#[derive(Args, Debug)]
pub struct EtoroCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: EtoroSubcommand,
}

/// Key pair, from flags or `ETORO_*` environment variables.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Public API key
    #[arg(long, env = env::API_KEY, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// User key
    #[arg(long, env = env::USER_KEY, hide_env_values = true, global = true)]
    pub user_key: Option<String>,

    /// Account type: demo or real
    #[arg(long, env = env::ACCOUNT_TYPE, global = true)]
    pub account_type: Option<String>,

    /// API base URL
    #[arg(long, env = env::BASE_URL, global = true)]
    pub base_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl ConnectionArgs {
    fn client(&self) -> Result<EtoroClient> {
        let config = EtoroConfig::from_lookup(|name| match name {
            env::API_KEY => self.api_key.clone(),
            env::USER_KEY => self.user_key.clone(),
            env::ACCOUNT_TYPE => self.account_type.clone(),
            env::BASE_URL => self.base_url.clone(),
            _ => None,
        })
        .context("Invalid eToro configuration")?;
        EtoroClient::new(config).context("Failed to create eToro client")
    }
}

#[derive(Subcommand, Debug)]
pub enum EtoroSubcommand {
    /// Check that the key pair is accepted
    Check,

    /// Balance, equity and margin
    Account,

    /// Portfolio allocation and performance
    Portfolio,

    /// Search tradeable instruments
    Search(markets::SearchArgs),

    /// Instrument spread, hours and limits
    Metadata(markets::MetadataArgs),

    /// Current bid and ask
    Rates(markets::RatesArgs),

    /// List open positions
    Positions,

    /// Open a position
    Open(positions::OpenArgs),

    /// Move stop loss or take profit
    Amend(positions::AmendArgs),

    /// Close a position
    Close(positions::CloseArgs),
}

pub async fn handle(cmd: EtoroCommand) -> Result<()> {
    let client = cmd.connection.client()?;
    let pretty = cmd.connection.pretty;

    match cmd.command {
        EtoroSubcommand::Check => account::check(&client).await,
        EtoroSubcommand::Account => account::info(&client, pretty).await,
        EtoroSubcommand::Portfolio => account::portfolio(&client, pretty).await,
        EtoroSubcommand::Search(args) => markets::search(&client, args, pretty).await,
        EtoroSubcommand::Metadata(args) => markets::metadata(&client, args, pretty).await,
        EtoroSubcommand::Rates(args) => markets::rates(&client, args, pretty).await,
        EtoroSubcommand::Positions => positions::list(&client, pretty).await,
        EtoroSubcommand::Open(args) => positions::open(&client, args, pretty).await,
        EtoroSubcommand::Amend(args) => positions::amend(&client, args, pretty).await,
        EtoroSubcommand::Close(args) => positions::close(&client, args, pretty).await,
    }
}
