//! Position commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bourse_capital::{AmendPosition, CapitalClient, OpenPosition, Protection};
use bourse_core::Direction;

use crate::output;

/// Stop-loss and take-profit flags shared by `open` and `amend`.
#[derive(Args, Debug, Default)]
pub struct ProtectionArgs {
    /// Use a guaranteed stop (needs a stop level, distance or amount)
    #[arg(long)]
    pub guaranteed_stop: bool,

    /// Use a trailing stop (needs --stop-distance)
    #[arg(long)]
    pub trailing_stop: bool,

    /// Price at which the stop loss triggers
    #[arg(long)]
    pub stop_level: Option<f64>,

    /// Distance from the current price to the stop loss
    #[arg(long)]
    pub stop_distance: Option<f64>,

    /// Loss amount at which the stop loss triggers
    #[arg(long)]
    pub stop_amount: Option<f64>,

    /// Price at which the take profit triggers
    #[arg(long)]
    pub profit_level: Option<f64>,

    /// Distance from the current price to the take profit
    #[arg(long)]
    pub profit_distance: Option<f64>,

    /// Profit amount at which the take profit triggers
    #[arg(long)]
    pub profit_amount: Option<f64>,
}

impl From<ProtectionArgs> for Protection {
    fn from(args: ProtectionArgs) -> Self {
        Protection {
            guaranteed_stop: args.guaranteed_stop.then_some(true),
            trailing_stop: args.trailing_stop.then_some(true),
            stop_level: args.stop_level,
            stop_distance: args.stop_distance,
            stop_amount: args.stop_amount,
            profit_level: args.profit_level,
            profit_distance: args.profit_distance,
            profit_amount: args.profit_amount,
        }
    }
}

#[derive(Args, Debug)]
pub struct PositionsArgs {
    /// Show only this deal
    pub deal_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Market epic
    #[arg(long)]
    pub epic: String,

    /// BUY or SELL
    #[arg(long)]
    pub direction: Direction,

    /// Position size
    #[arg(long)]
    pub size: f64,

    #[command(flatten)]
    pub protection: ProtectionArgs,
}

#[derive(Args, Debug)]
pub struct AmendArgs {
    /// Deal to amend
    pub deal_id: String,

    #[command(flatten)]
    pub protection: ProtectionArgs,
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Deal to close
    pub deal_id: String,
}

pub async fn list(client: &CapitalClient, args: PositionsArgs, pretty: bool) -> Result<()> {
    let result = match &args.deal_id {
        Some(deal_id) => client.position(deal_id).await,
        None => client.positions().await,
    };
    let positions = result.context("Failed to fetch positions")?;
    output::response(&positions, pretty)
}

pub async fn open(client: &CapitalClient, args: OpenArgs, pretty: bool) -> Result<()> {
    let order = OpenPosition::new(&args.epic, args.direction, args.size)
        .with_protection(args.protection.into());

    eprintln!(
        "{}",
        format!("Opening {} {} {}...", order.direction, order.size, order.epic).dimmed()
    );
    let result = client
        .open_position(&order)
        .await
        .context("Failed to open position")?;
    output::response(&result, pretty)
}

pub async fn amend(client: &CapitalClient, args: AmendArgs, pretty: bool) -> Result<()> {
    let amendment = AmendPosition::new(args.protection.into());
    let result = client
        .amend_position(&args.deal_id, &amendment)
        .await
        .with_context(|| format!("Failed to amend position {}", args.deal_id))?;
    output::response(&result, pretty)
}

pub async fn close(client: &CapitalClient, args: CloseArgs, pretty: bool) -> Result<()> {
    let result = client
        .close_position(&args.deal_id)
        .await
        .with_context(|| format!("Failed to close position {}", args.deal_id))?;
    output::response(&result, pretty)
}
