//! Working order commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bourse_capital::{AmendWorkingOrder, CapitalClient, OrderType, WorkingOrder};
use bourse_core::Direction;

use crate::output;

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    /// List working orders
    List,

    /// Place a limit or stop order
    Create(CreateArgs),

    /// Change the levels of a working order
    Amend(AmendArgs),

    /// Cancel a working order
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Market epic
    #[arg(long)]
    pub epic: String,

    /// BUY or SELL
    #[arg(long)]
    pub direction: Direction,

    /// Order size
    #[arg(long)]
    pub size: f64,

    /// Trigger price
    #[arg(long)]
    pub level: f64,

    /// LIMIT or STOP
    #[arg(long = "type", default_value = "STOP")]
    pub order_type: OrderType,

    /// Expire at this time (YYYY-MM-DDTHH:MM:SS) instead of when cancelled
    #[arg(long)]
    pub good_till: Option<String>,

    /// Stop-loss price
    #[arg(long)]
    pub stop_level: Option<f64>,

    /// Take-profit price
    #[arg(long)]
    pub profit_level: Option<f64>,
}

#[derive(Args, Debug)]
pub struct AmendArgs {
    /// Working order id (from `orders list`, not the deal reference)
    pub order_id: String,

    /// New trigger price
    #[arg(long)]
    pub level: Option<f64>,

    /// New stop-loss price
    #[arg(long)]
    pub stop_level: Option<f64>,

    /// New take-profit price
    #[arg(long)]
    pub profit_level: Option<f64>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Working order id
    pub order_id: String,
}

pub async fn handle(client: &CapitalClient, cmd: OrdersCommand, pretty: bool) -> Result<()> {
    let result = match cmd {
        OrdersCommand::List => client
            .working_orders()
            .await
            .context("Failed to list working orders")?,
        OrdersCommand::Create(args) => {
            let mut order = WorkingOrder::new(
                args.epic,
                args.direction,
                args.size,
                args.level,
                args.order_type,
            );
            if let Some(date) = args.good_till {
                order = order.good_till(date);
            }
            if let Some(level) = args.stop_level {
                order = order.with_stop_level(level);
            }
            if let Some(level) = args.profit_level {
                order = order.with_profit_level(level);
            }
            client
                .create_working_order(&order)
                .await
                .context("Failed to create working order")?
        }
        OrdersCommand::Amend(args) => {
            let amendment = AmendWorkingOrder {
                level: args.level,
                stop_level: args.stop_level,
                profit_level: args.profit_level,
            };
            client
                .amend_working_order(&args.order_id, &amendment)
                .await
                .with_context(|| format!("Failed to amend working order {}", args.order_id))?
        }
        OrdersCommand::Delete(args) => client
            .delete_working_order(&args.order_id)
            .await
            .with_context(|| format!("Failed to delete working order {}", args.order_id))?,
    };
    output::response(&result, pretty)
}
