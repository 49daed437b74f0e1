//! # IndexArb Models
//!
//! Typed domain records for the options-arbitrage research platform.
//!
//! Everything here is a plain value type: market-data bars, liquidity-aware
//! price quotes, position legs, scan results, and the business constants
//! that drive strategy logic. No I/O, no logging. The analytical crates
//! (`indexarb-data`, `indexarb-engine`, `indexarb-broker`) all build on
//! these records so that data flows through the system in one shape.
//!
//! ## Error model
//! Every failure the platform can surface is one of the enumerated
//! conditions in [`Error`]. Callers branch on the kind, never on message
//! text.

pub mod config;
mod error;
mod market;
mod position;
mod scan;

pub use error::{Error, Result};
pub use market::{
    LiquidityWarning, OptionBar, OptionQuoteBar, PriceQuote, PriceSource, Right, UnderlyingBar,
};
pub use position::{
    Leg, LegAction, Position, SpreadDirection, StrategyConfig, StrategyKind, CONTRACT_MULTIPLIER,
};
pub use scan::{RankBy, ScanDirection, ScanOutcome, ScanResult};
