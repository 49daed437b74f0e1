//! Option price lookup with liquidity annotations.
//!
//! One primary operation: resolve a contract's price at a timestamp from
//! whichever sources the day has, preferring two-sided quote midpoints
//! over trade prints. The result always says where the price came from
//! and whether it is executable; a stale price is returned for display
//! but position construction refuses to build on it.
//!
//! ## Staleness
//! A price is stale when nothing supports it at the query time: a trade
//! print with volume 0 (carried forward by the feed), or a midpoint with
//! no fresh trade at or before `t` and no valid quote at exactly `t`.
//! A valid two-sided quote at exactly `t` is never stale; quotes are live
//! by construction when both sides are positive.

use chrono::{DateTime, Utc};

use indexarb_data::{OptionSeries, QuoteSeries};
use indexarb_models::config::{DEFAULT_MIN_VOLUME, WIDE_SPREAD_THRESHOLD};
use indexarb_models::{LiquidityWarning, PriceQuote, PriceSource, Right};

/// Price lookup over the option sources loaded for one trading date.
///
/// Either source may be absent; with neither, every query resolves to
/// `None`. Lookups never cross outside the loaded date because the series
/// are scoped to a single day.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceLookup<'a> {
    pub trades: Option<&'a OptionSeries>,
    pub quotes: Option<&'a QuoteSeries>,
}

impl<'a> PriceLookup<'a> {
    pub fn new(trades: Option<&'a OptionSeries>, quotes: Option<&'a QuoteSeries>) -> Self {
        Self { trades, quotes }
    }

    /// Resolve a contract's price at `t`, or `None` when no source has a
    /// row at or before `t`.
    pub fn price_at(
        &self,
        symbol: &str,
        strike: f64,
        right: Right,
        t: DateTime<Utc>,
    ) -> Option<PriceQuote> {
        let trade_bars = self.trades.map(|s| s.contract(symbol, strike, right));
        let trade_row = trade_bars.as_ref().and_then(|c| c.at_or_before(t));
        let volume = trade_row.map(|r| r.volume).unwrap_or(0);

        let quote_bars = self.quotes.map(|s| s.contract(symbol, strike, right));
        let quote_row = quote_bars.as_ref().and_then(|c| c.valid_at_or_before(t));

        if let Some(q) = quote_row {
            let spread = q.ask - q.bid;
            let spread_pct = if q.midpoint > 0.0 {
                Some(spread / q.midpoint * 100.0)
            } else {
                None
            };

            let fresh_trade = trade_bars
                .as_ref()
                .and_then(|c| c.liquid_at_or_before(t))
                .is_some();
            let quote_at_t = q.ts == t;
            let is_stale = !fresh_trade && !quote_at_t;

            let warning = if spread_pct.is_some_and(|p| p > WIDE_SPREAD_THRESHOLD) {
                Some(LiquidityWarning::WideSpread)
            } else if volume < DEFAULT_MIN_VOLUME {
                Some(LiquidityWarning::LowVolume)
            } else {
                None
            };

            return Some(PriceQuote {
                price: q.midpoint,
                source: PriceSource::Midpoint,
                volume,
                bid: Some(q.bid),
                ask: Some(q.ask),
                spread: Some(spread),
                spread_pct,
                is_stale,
                warning,
            });
        }

        let row = trade_row?;
        Some(PriceQuote {
            price: row.close,
            source: PriceSource::Trade,
            volume: row.volume,
            bid: None,
            ask: None,
            spread: None,
            spread_pct: None,
            is_stale: row.volume == 0,
            warning: Some(LiquidityWarning::NoQuote),
        })
    }
}
