//! Market data and watchlist commands.

use anyhow::{Context, Result, bail};
use clap::Args;

use bourse_capital::{CapitalClient, PriceQuery, Resolution};

use crate::output;

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Free-text search, e.g. "gold"
    pub search: Option<String>,

    /// Comma-separated epics to fetch instead of searching
    #[arg(long, value_delimiter = ',', conflicts_with = "search")]
    pub epics: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Market epic, e.g. SILVER
    pub epic: String,
}

#[derive(Args, Debug)]
pub struct PricesArgs {
    /// Market epic
    pub epic: String,

    /// Candle width (MINUTE, MINUTE_5, ..., HOUR_4, DAY, WEEK)
    #[arg(long, default_value = "MINUTE")]
    pub resolution: Resolution,

    /// Maximum number of candles
    #[arg(long, default_value_t = 10)]
    pub max: u32,

    /// Start time, YYYY-MM-DDTHH:MM:SS
    #[arg(long)]
    pub from: Option<String>,

    /// End time, YYYY-MM-DDTHH:MM:SS
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args, Debug)]
pub struct WatchlistsArgs {
    /// Show this watchlist's markets instead of listing watchlists
    pub watchlist_id: Option<String>,
}

pub async fn markets(client: &CapitalClient, args: MarketsArgs, pretty: bool) -> Result<()> {
    let result = match (&args.search, args.epics.as_slice()) {
        (Some(term), _) => client.search_markets(term).await,
        (None, []) => bail!("Give a search term or --epics"),
        (None, epics) => {
            let epics: Vec<&str> = epics.iter().map(String::as_str).collect();
            client.markets(&epics).await
        }
    };
    let markets = result.context("Failed to fetch markets")?;
    output::response(&markets, pretty)
}

pub async fn market(client: &CapitalClient, args: MarketArgs, pretty: bool) -> Result<()> {
    let market = client
        .market(&args.epic)
        .await
        .with_context(|| format!("Failed to fetch market {}", args.epic))?;
    output::response(&market, pretty)
}

pub async fn prices(client: &CapitalClient, args: PricesArgs, pretty: bool) -> Result<()> {
    let query = PriceQuery {
        resolution: args.resolution,
        max: args.max,
        from: args.from,
        to: args.to,
    };
    let prices = client
        .prices(&args.epic, &query)
        .await
        .with_context(|| format!("Failed to fetch prices for {}", args.epic))?;
    output::response(&prices, pretty)
}

pub async fn watchlists(client: &CapitalClient, args: WatchlistsArgs, pretty: bool) -> Result<()> {
    let result = match &args.watchlist_id {
        Some(id) => client.watchlist(id).await,
        None => client.watchlists().await,
    };
    let watchlists = result.context("Failed to fetch watchlists")?;
    output::response(&watchlists, pretty)
}
