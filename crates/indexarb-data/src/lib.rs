//! # IndexArb Data
//!
//! Per-date CSV market-data loading and time-indexed series views.
//!
//! ## File layout
//! One directory per data root, one file set per trading date:
//! ```text
//! data/
//!   underlying_prices_{yyyymmdd}.csv   # symbol,time,open,high,low,close,volume
//!   options_data_{yyyymmdd}.csv        # symbol,strike,right,time,open,high,low,close,volume
//!   options_bidask_{yyyymmdd}.csv      # symbol,strike,right,time,bid,ask,midpoint
//! ```
//!
//! ## Presence rules
//! - Missing underlying file: the day is unusable (`not_found`).
//! - Missing trades and/or bid-ask: permitted; loaders return `None` and
//!   downstream pricing degrades to whichever source exists.
//!
//! Timestamps parse as UTC regardless of the offset they were written
//! with. Series are immutable once loaded and may be shared across
//! concurrent scans.

mod loader;
mod series;

pub use loader::{
    available_pairs, list_dates, load_option_quotes, load_option_trades, load_underlying,
    TradingDate,
};
pub use series::{
    ContractBars, ContractQuotes, OptionSeries, QuoteSeries, UnderlyingFrame, UnderlyingSeries,
};
