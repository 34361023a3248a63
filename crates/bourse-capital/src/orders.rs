//! Validated order payloads.
//!
//! Capital.com rejects some stop/limit combinations with a generic error;
//! these types reject them locally before anything is sent.

use serde::Serialize;

use bourse_core::error::InvalidInputError;
use bourse_core::{Direction, Result, check_path_segment};

/// Stop-loss and take-profit settings shared by new and amended positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Protection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guaranteed_stop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_amount: Option<f64>,
}

impl Protection {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the combinations Capital.com forbids.
    pub fn validate(&self) -> Result<()> {
        let guaranteed = self.guaranteed_stop == Some(true);
        let trailing = self.trailing_stop == Some(true);

        if guaranteed && trailing {
            return Err(invalid(
                "guaranteedStop",
                "cannot be combined with trailingStop",
            ));
        }
        if trailing && self.stop_distance.is_none() {
            return Err(invalid("stopDistance", "required when trailingStop is set"));
        }
        if guaranteed
            && self.stop_level.is_none()
            && self.stop_distance.is_none()
            && self.stop_amount.is_none()
        {
            return Err(invalid(
                "guaranteedStop",
                "requires stopLevel, stopDistance or stopAmount",
            ));
        }
        Ok(())
    }
}

/// Body of `POST /positions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub epic: String,
    pub direction: Direction,
    pub size: f64,
    #[serde(flatten)]
    pub protection: Protection,
}

impl OpenPosition {
    pub fn new(epic: impl Into<String>, direction: Direction, size: f64) -> Self {
        Self {
            epic: epic.into(),
            direction,
            size,
            protection: Protection::default(),
        }
    }

    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_epic(&self.epic)?;
        require_positive("size", self.size)?;
        self.protection.validate()
    }
}

/// Body of `PUT /positions/{dealId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AmendPosition {
    pub protection: Protection,
}

impl AmendPosition {
    pub fn new(protection: Protection) -> Self {
        Self { protection }
    }

    pub fn validate(&self) -> Result<()> {
        if self.protection.is_empty() {
            return Err(InvalidInputError::parameter(
                "amendment",
                "at least one stop or profit field must be set",
            )
            .into());
        }
        self.protection.validate()
    }
}

/// Trigger type of a working order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    #[default]
    Stop,
}

impl std::str::FromStr for OrderType {
    type Err = bourse_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LIMIT" => Ok(OrderType::Limit),
            "STOP" => Ok(OrderType::Stop),
            _ => Err(invalid("type", "must be 'LIMIT' or 'STOP'")),
        }
    }
}

/// Body of `POST /workingorders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrder {
    pub epic: String,
    pub direction: Direction,
    pub size: f64,
    pub level: f64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub good_till_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_level: Option<f64>,
}

impl WorkingOrder {
    pub fn new(
        epic: impl Into<String>,
        direction: Direction,
        size: f64,
        level: f64,
        order_type: OrderType,
    ) -> Self {
        Self {
            epic: epic.into(),
            direction,
            size,
            level,
            order_type,
            time_in_force: "GOOD_TILL_CANCELLED".to_string(),
            good_till_date: None,
            stop_level: None,
            profit_level: None,
        }
    }

    /// Expire the order at `date` (`YYYY-MM-DDTHH:MM:SS`) instead of
    /// keeping it until cancelled.
    pub fn good_till(mut self, date: impl Into<String>) -> Self {
        self.time_in_force = "GOOD_TILL_DATE".to_string();
        self.good_till_date = Some(date.into());
        self
    }

    pub fn with_stop_level(mut self, level: f64) -> Self {
        self.stop_level = Some(level);
        self
    }

    pub fn with_profit_level(mut self, level: f64) -> Self {
        self.profit_level = Some(level);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_epic(&self.epic)?;
        require_positive("size", self.size)?;
        require_positive("level", self.level)
    }
}

/// Body of `PUT /workingorders/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendWorkingOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_level: Option<f64>,
}

impl AmendWorkingOrder {
    pub fn validate(&self) -> Result<()> {
        if *self == Self::default() {
            return Err(InvalidInputError::parameter(
                "amendment",
                "at least one of level, stopLevel or profitLevel must be set",
            )
            .into());
        }
        Ok(())
    }
}

/// A value sent in a body or query string.
pub(crate) fn require_text(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(name, "must not be empty"));
    }
    Ok(())
}

/// An id that becomes one segment of the request path.
pub(crate) fn require_id(name: &str, id: &str) -> Result<()> {
    check_path_segment(name, id)
}

fn require_epic(epic: &str) -> Result<()> {
    require_id("epic", epic)
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(name, "must be a positive number"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> bourse_core::Error {
    InvalidInputError::parameter(name, reason).into()
}
