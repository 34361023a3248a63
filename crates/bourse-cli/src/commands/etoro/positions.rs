//! Position commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bourse_core::Direction;
use bourse_etoro::{AmendPosition, EtoroClient, OpenPosition};

use crate::output;

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Instrument id
    #[arg(long)]
    pub instrument: u64,

    /// BUY or SELL
    #[arg(long)]
    pub direction: Direction,

    /// Amount to invest, in account currency
    #[arg(long)]
    pub amount: f64,

    /// Leverage multiplier
    #[arg(long, default_value_t = 1)]
    pub leverage: u32,

    /// Stop-loss price
    #[arg(long)]
    pub stop_loss: Option<f64>,

    /// Take-profit price
    #[arg(long)]
    pub take_profit: Option<f64>,
}

#[derive(Args, Debug)]
pub struct AmendArgs {
    /// Position id
    pub position_id: String,

    /// New stop-loss price
    #[arg(long)]
    pub stop_loss: Option<f64>,

    /// New take-profit price
    #[arg(long)]
    pub take_profit: Option<f64>,
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Position id
    pub position_id: String,
}

pub async fn list(client: &EtoroClient, pretty: bool) -> Result<()> {
    let positions = client
        .positions()
        .await
        .context("Failed to fetch positions")?;
    output::response(&positions, pretty)
}

pub async fn open(client: &EtoroClient, args: OpenArgs, pretty: bool) -> Result<()> {
    let order = OpenPosition {
        instrument_id: args.instrument,
        direction: args.direction,
        amount: args.amount,
        leverage: args.leverage,
        stop_loss: args.stop_loss,
        take_profit: args.take_profit,
    };

    eprintln!(
        "{}",
        format!(
            "Opening {} {} on instrument {} (x{})...",
            order.direction, order.amount, order.instrument_id, order.leverage
        )
        .dimmed()
    );
    let result = client
        .open_position(&order)
        .await
        .context("Failed to open position")?;
    output::response(&result, pretty)
}

pub async fn amend(client: &EtoroClient, args: AmendArgs, pretty: bool) -> Result<()> {
    let amendment = AmendPosition {
        stop_loss: args.stop_loss,
        take_profit: args.take_profit,
    };
    let result = client
        .amend_position(&args.position_id, &amendment)
        .await
        .with_context(|| format!("Failed to amend position {}", args.position_id))?;
    output::response(&result, pretty)
}

pub async fn close(client: &EtoroClient, args: CloseArgs, pretty: bool) -> Result<()> {
    let result = client
        .close_position(&args.position_id)
        .await
        .with_context(|| format!("Failed to close position {}", args.position_id))?;
    output::response(&result, pretty)
}
