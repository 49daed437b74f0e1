//! Market-data bar records and the liquidity-aware price quote.
//!
//! Bars are loaded once per trading date and stay immutable for the life
//! of a request. [`PriceQuote`] is derived on demand by the pricing layer
//! and never cached across requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Right {
    #[serde(rename = "C")]
    Call,
    #[serde(rename = "P")]
    Put,
}

impl Right {
    pub fn as_str(&self) -> &'static str {
        match self {
            Right::Call => "C",
            Right::Put => "P",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Right {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" | "c" => Ok(Right::Call),
            "P" | "p" => Ok(Right::Put),
            other => Err(Error::InvalidArgument(format!(
                "unknown option right: {other:?}"
            ))),
        }
    }
}

/// One minute bar of an underlying (SPY/SPX/XSP).
///
/// Keyed by (symbol, ts); ordered by ts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingBar {
    pub symbol: String,
    /// UTC, minute-aligned.
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One minute bar of option trades.
///
/// `volume == 0` means the upstream feed carried a stale print forward;
/// such a bar is never executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBar {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// One minute bar of option bid/ask quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuoteBar {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    pub ts: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub midpoint: f64,
}

impl OptionQuoteBar {
    /// A quote bar is valid iff both sides are positive.
    pub fn is_valid(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }
}

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Midpoint,
    Trade,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Midpoint => f.write_str("midpoint"),
            PriceSource::Trade => f.write_str("trade"),
        }
    }
}

/// Liquidity caveat attached to a resolved price.
///
/// At most one is reported; when several apply the precedence is
/// `WideSpread` > `NoQuote` > `LowVolume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityWarning {
    /// Bid-ask spread above the wide-spread threshold.
    WideSpread,
    /// Trade volume below the minimum-volume floor.
    LowVolume,
    /// Priced from trades because no valid two-sided quote existed.
    NoQuote,
}

/// A liquidity-annotated option price at a point in time.
///
/// A stale quote may be displayed but must never back a tradable
/// position; position construction enforces that gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub source: PriceSource,
    /// Volume of the nearest trade bar at or before the query time.
    pub volume: u64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub spread: Option<f64>,
    pub spread_pct: Option<f64>,
    pub is_stale: bool,
    pub warning: Option<LiquidityWarning>,
}

impl PriceQuote {
    /// True when this price can back a leg of a new position.
    pub fn is_executable(&self) -> bool {
        !self.is_stale
    }
}
