//! Instrument and rate commands.

use anyhow::{Context, Result};
use clap::Args;

use bourse_etoro::{EtoroClient, InstrumentSearch};

use crate::output;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search text, e.g. "Apple"
    pub query: Option<String>,

    /// Category filter, e.g. stocks, crypto, currencies
    #[arg(long)]
    pub category: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Instrument id
    pub instrument_id: u64,
}

#[derive(Args, Debug)]
pub struct RatesArgs {
    /// One or more instrument ids
    #[arg(required = true, num_args = 1.., value_delimiter = ',')]
    pub instrument_ids: Vec<u64>,
}

pub async fn search(client: &EtoroClient, args: SearchArgs, pretty: bool) -> Result<()> {
    let search = InstrumentSearch {
        query: args.query,
        category: args.category,
        limit: args.limit,
    };
    let found = client
        .search_instruments(&search)
        .await
        .context("Failed to search instruments")?;
    output::response(&found, pretty)
}

pub async fn metadata(client: &EtoroClient, args: MetadataArgs, pretty: bool) -> Result<()> {
    let metadata = client
        .instrument_metadata(args.instrument_id)
        .await
        .with_context(|| format!("Failed to fetch instrument {}", args.instrument_id))?;
    output::response(&metadata, pretty)
}

pub async fn rates(client: &EtoroClient, args: RatesArgs, pretty: bool) -> Result<()> {
    let rates = client
        .current_rates(&args.instrument_ids)
        .await
        .context("Failed to fetch rates")?;
    output::response(&rates, pretty)
}
