//! Market data query parameters.

use std::fmt;
use std::str::FromStr;

use bourse_core::error::InvalidInputError;
use bourse_core::{Error, PendingRequest};

/// Candle width for historical prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    Minute,
    Minute5,
    Minute15,
    Minute30,
    Hour,
    Hour4,
    Day,
    Week,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Minute => "MINUTE",
            Resolution::Minute5 => "MINUTE_5",
            Resolution::Minute15 => "MINUTE_15",
            Resolution::Minute30 => "MINUTE_30",
            Resolution::Hour => "HOUR",
            Resolution::Hour4 => "HOUR_4",
            Resolution::Day => "DAY",
            Resolution::Week => "WEEK",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let resolution = match s.to_ascii_uppercase().as_str() {
            "MINUTE" => Resolution::Minute,
            "MINUTE_5" => Resolution::Minute5,
            "MINUTE_15" => Resolution::Minute15,
            "MINUTE_30" => Resolution::Minute30,
            "HOUR" => Resolution::Hour,
            "HOUR_4" => Resolution::Hour4,
            "DAY" => Resolution::Day,
            "WEEK" => Resolution::Week,
            _ => {
                return Err(InvalidInputError::parameter(
                    "resolution",
                    "expected MINUTE, MINUTE_5, MINUTE_15, MINUTE_30, HOUR, HOUR_4, DAY or WEEK",
                )
                .into());
            }
        };
        Ok(resolution)
    }
}

/// Parameters of `GET /prices/{epic}`.
///
/// `from` and `to` are `YYYY-MM-DDTHH:MM:SS` timestamps in the API's own
/// timezone and are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub resolution: Resolution,
    pub max: u32,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for PriceQuery {
    fn default() -> Self {
        Self {
            resolution: Resolution::Minute,
            max: 10,
            from: None,
            to: None,
        }
    }
}

impl PriceQuery {
    pub(crate) fn apply(&self, request: PendingRequest) -> PendingRequest {
        request
            .query("resolution", self.resolution)
            .query("max", self.max)
            .query_opt("from", self.from.as_deref())
            .query_opt("to", self.to.as_deref())
    }
}
