//! Capital.com subcommands.

mod account;
mod markets;
mod positions;
mod working_orders;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bourse_capital::config::env;
use bourse_capital::{CapitalClient, CapitalConfig};

#[derive(Args, Debug)]
pub struct CapitalCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: CapitalSubcommand,
}

/// Login material, from flags or `CAPITAL_*` environment variables.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// API key
    #[arg(long, env = env::API_KEY, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Login identifier (usually the account email)
    #[arg(long, env = env::IDENTIFIER, global = true)]
    pub identifier: Option<String>,

    /// API key password
    #[arg(long, env = env::PASSWORD, hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Account type: demo or live
    #[arg(long, env = env::ACCOUNT_TYPE, global = true)]
    pub account_type: Option<String>,

    /// API base URL (defaults to the demo or live host)
    #[arg(long, env = env::BASE_URL, global = true)]
    pub base_url: Option<String>,

    /// Account to select after login
    #[arg(long, env = "CAPITAL_ACCOUNT_ID", global = true)]
    pub account_id: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl ConnectionArgs {
    fn client(&self) -> Result<CapitalClient> {
        let mut config = CapitalConfig::from_lookup(|name| match name {
            env::API_KEY => self.api_key.clone(),
            env::IDENTIFIER => self.identifier.clone(),
            env::PASSWORD => self.password.clone(),
            env::ACCOUNT_TYPE => self.account_type.clone(),
            env::BASE_URL => self.base_url.clone(),
            _ => None,
        })
        .context("Invalid Capital.com configuration")?;

        if let Some(account_id) = &self.account_id {
            config = config.with_preferred_account(account_id);
        }
        CapitalClient::new(config).context("Failed to create Capital.com client")
    }
}

#[derive(Subcommand, Debug)]
pub enum CapitalSubcommand {
    /// Log in and show the selected account
    Login(account::LoginArgs),

    /// Show the current session
    Session,

    /// List trading accounts
    Accounts,

    /// Show account preferences
    Preferences,

    /// Switch the active account
    SwitchAccount(account::SwitchAccountArgs),

    /// Search markets by name or list epics
    Markets(markets::MarketsArgs),

    /// Show one market
    Market(markets::MarketArgs),

    /// Historical prices for an epic
    Prices(markets::PricesArgs),

    /// List open positions, or show one
    Positions(positions::PositionsArgs),

    /// Open a position
    Open(positions::OpenArgs),

    /// Change stops and limits of a position
    Amend(positions::AmendArgs),

    /// Close a position
    Close(positions::CloseArgs),

    /// Working (limit and stop) orders
    #[command(subcommand)]
    Orders(working_orders::OrdersCommand),

    /// Check the outcome of a deal
    Confirm(account::ConfirmArgs),

    /// List watchlists, or show one
    Watchlists(markets::WatchlistsArgs),

    /// Server time
    Time,

    /// Keep the session alive
    Ping,
}

pub async fn handle(cmd: CapitalCommand) -> Result<()> {
    let client = cmd.connection.client()?;
    let pretty = cmd.connection.pretty;

    match cmd.command {
        CapitalSubcommand::Login(args) => account::login(&client, args).await,
        CapitalSubcommand::Session => account::session(&client, pretty).await,
        CapitalSubcommand::Accounts => account::accounts(&client, pretty).await,
        CapitalSubcommand::Preferences => account::preferences(&client, pretty).await,
        CapitalSubcommand::SwitchAccount(args) => {
            account::switch_account(&client, args, pretty).await
        }
        CapitalSubcommand::Markets(args) => markets::markets(&client, args, pretty).await,
        CapitalSubcommand::Market(args) => markets::market(&client, args, pretty).await,
        CapitalSubcommand::Prices(args) => markets::prices(&client, args, pretty).await,
        CapitalSubcommand::Positions(args) => positions::list(&client, args, pretty).await,
        CapitalSubcommand::Open(args) => positions::open(&client, args, pretty).await,
        CapitalSubcommand::Amend(args) => positions::amend(&client, args, pretty).await,
        CapitalSubcommand::Close(args) => positions::close(&client, args, pretty).await,
        CapitalSubcommand::Orders(cmd) => working_orders::handle(&client, cmd, pretty).await,
        CapitalSubcommand::Confirm(args) => account::confirm(&client, args, pretty).await,
        CapitalSubcommand::Watchlists(args) => markets::watchlists(&client, args, pretty).await,
        CapitalSubcommand::Time => account::time(&client, pretty).await,
        CapitalSubcommand::Ping => account::ping(&client, pretty).await,
    }
}
