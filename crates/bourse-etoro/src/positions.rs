//! Position request bodies.

use serde::Serialize;

use bourse_core::error::InvalidInputError;
use bourse_core::{Direction, Result, check_path_segment};

/// Body of `POST /positions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub instrument_id: u64,
    pub direction: Direction,
    /// Investment in account currency.
    pub amount: f64,
    pub leverage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl OpenPosition {
    pub fn new(instrument_id: u64, direction: Direction, amount: f64) -> Self {
        Self {
            instrument_id,
            direction,
            amount,
            leverage: 1,
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_stop_loss(mut self, level: f64) -> Self {
        self.stop_loss = Some(level);
        self
    }

    pub fn with_take_profit(mut self, level: f64) -> Self {
        self.take_profit = Some(level);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_instrument(self.instrument_id)?;
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(InvalidInputError::parameter("amount", "must be greater than 0").into());
        }
        if self.leverage < 1 {
            return Err(InvalidInputError::parameter("leverage", "must be at least 1").into());
        }
        Ok(())
    }
}

/// Body of `PUT /positions/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl AmendPosition {
    pub fn validate(&self) -> Result<()> {
        if self.stop_loss.is_none() && self.take_profit.is_none() {
            return Err(InvalidInputError::parameter(
                "amendment",
                "stopLoss or takeProfit must be set",
            )
            .into());
        }
        Ok(())
    }
}

pub(crate) fn require_instrument(instrument_id: u64) -> Result<()> {
    if instrument_id == 0 {
        return Err(
            InvalidInputError::parameter("instrumentId", "must be a positive integer").into(),
        );
    }
    Ok(())
}

pub(crate) fn require_position(position_id: &str) -> Result<()> {
    check_path_segment("positionId", position_id)
}
