//! Time-indexed views over loaded bars.
//!
//! All containers hold bars sorted by timestamp and answer
//! nearest-at-or-before point queries by binary search. Because every
//! series is scoped to a single trading date, an at-or-before lookup can
//! never cross into a previous day; a query before the first bar simply
//! returns nothing.

use chrono::{DateTime, Utc};
use indexarb_models::{OptionBar, OptionQuoteBar, Right, UnderlyingBar};

/// All underlying bars of one trading date, across symbols.
#[derive(Debug, Clone, Default)]
pub struct UnderlyingSeries {
    bars: Vec<UnderlyingBar>,
}

impl UnderlyingSeries {
    /// Build a series from bars in any order.
    pub fn new(mut bars: Vec<UnderlyingBar>) -> Self {
        bars.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.ts.cmp(&b.ts)));
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[UnderlyingBar] {
        &self.bars
    }

    /// Distinct symbols present, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut syms: Vec<String> = self.bars.iter().map(|b| b.symbol.clone()).collect();
        syms.sort();
        syms.dedup();
        syms
    }

    /// Per-symbol frame, bars ordered by timestamp.
    pub fn symbol_frame(&self, symbol: &str) -> UnderlyingFrame {
        let bars: Vec<UnderlyingBar> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol)
            .cloned()
            .collect();
        UnderlyingFrame {
            symbol: symbol.to_string(),
            bars,
        }
    }

    /// Split into the two frames of a pair.
    pub fn symbol_frames(&self, sym1: &str, sym2: &str) -> (UnderlyingFrame, UnderlyingFrame) {
        (self.symbol_frame(sym1), self.symbol_frame(sym2))
    }
}

/// One symbol's underlying bars for the day, ordered by timestamp.
#[derive(Debug, Clone)]
pub struct UnderlyingFrame {
    pub symbol: String,
    bars: Vec<UnderlyingBar>,
}

impl UnderlyingFrame {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[UnderlyingBar] {
        &self.bars
    }

    /// First bar of the day (the open).
    pub fn first(&self) -> Option<&UnderlyingBar> {
        self.bars.first()
    }

    /// Last bar of the day (the close).
    pub fn last(&self) -> Option<&UnderlyingBar> {
        self.bars.last()
    }

    /// Latest bar at or before `t`, if any.
    pub fn at_or_before(&self, t: DateTime<Utc>) -> Option<&UnderlyingBar> {
        latest_at_or_before(&self.bars, t, |b| b.ts)
    }
}

/// All option trade bars of one trading date.
#[derive(Debug, Clone, Default)]
pub struct OptionSeries {
    bars: Vec<OptionBar>,
}

impl OptionSeries {
    /// Build a series from bars in any order.
    pub fn new(mut bars: Vec<OptionBar>) -> Self {
        bars.sort_by(|a, b| a.ts.cmp(&b.ts));
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Distinct strikes observed for a symbol, ascending.
    pub fn strikes_for(&self, symbol: &str) -> Vec<f64> {
        let mut strikes: Vec<f64> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol)
            .map(|b| b.strike)
            .collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        strikes
    }

    /// Bars of one contract, ordered by timestamp.
    pub fn contract(&self, symbol: &str, strike: f64, right: Right) -> ContractBars {
        let bars: Vec<OptionBar> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol && b.strike == strike && b.right == right)
            .cloned()
            .collect();
        ContractBars { bars }
    }
}

/// One option contract's trade bars for the day.
#[derive(Debug, Clone, Default)]
pub struct ContractBars {
    bars: Vec<OptionBar>,
}

impl ContractBars {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[OptionBar] {
        &self.bars
    }

    /// Total traded volume across the day.
    pub fn total_volume(&self) -> u64 {
        self.bars.iter().map(|b| b.volume).sum()
    }

    /// Bars with actual prints (volume > 0), in time order.
    pub fn liquid_bars(&self) -> Vec<&OptionBar> {
        self.bars.iter().filter(|b| b.volume > 0).collect()
    }

    /// Latest bar at or before `t`, stale prints included.
    pub fn at_or_before(&self, t: DateTime<Utc>) -> Option<&OptionBar> {
        latest_at_or_before(&self.bars, t, |b| b.ts)
    }

    /// Latest bar with volume > 0 at or before `t`.
    pub fn liquid_at_or_before(&self, t: DateTime<Utc>) -> Option<&OptionBar> {
        self.bars
            .iter()
            .rev()
            .find(|b| b.ts <= t && b.volume > 0)
    }
}

/// All option bid/ask bars of one trading date.
#[derive(Debug, Clone, Default)]
pub struct QuoteSeries {
    bars: Vec<OptionQuoteBar>,
}

impl QuoteSeries {
    /// Build a series from bars in any order.
    pub fn new(mut bars: Vec<OptionQuoteBar>) -> Self {
        bars.sort_by(|a, b| a.ts.cmp(&b.ts));
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Distinct strikes observed for a symbol, ascending.
    pub fn strikes_for(&self, symbol: &str) -> Vec<f64> {
        let mut strikes: Vec<f64> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol)
            .map(|b| b.strike)
            .collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        strikes
    }

    /// Quote bars of one contract, ordered by timestamp.
    pub fn contract(&self, symbol: &str, strike: f64, right: Right) -> ContractQuotes {
        let bars: Vec<OptionQuoteBar> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol && b.strike == strike && b.right == right)
            .cloned()
            .collect();
        ContractQuotes { bars }
    }
}

/// One option contract's quote bars for the day.
#[derive(Debug, Clone, Default)]
pub struct ContractQuotes {
    bars: Vec<OptionQuoteBar>,
}

impl ContractQuotes {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[OptionQuoteBar] {
        &self.bars
    }

    /// Two-sided quote bars (bid > 0 and ask > 0), in time order.
    pub fn valid_bars(&self) -> Vec<&OptionQuoteBar> {
        self.bars.iter().filter(|b| b.is_valid()).collect()
    }

    /// Latest valid two-sided quote at or before `t`.
    pub fn valid_at_or_before(&self, t: DateTime<Utc>) -> Option<&OptionQuoteBar> {
        self.bars.iter().rev().find(|b| b.ts <= t && b.is_valid())
    }
}

/// Latest element with key at or before `t`; ties break to the later row.
fn latest_at_or_before<T>(
    rows: &[T],
    t: DateTime<Utc>,
    key: impl Fn(&T) -> DateTime<Utc>,
) -> Option<&T> {
    let idx = rows.partition_point(|r| key(r) <= t);
    if idx == 0 {
        None
    } else {
        Some(&rows[idx - 1])
    }
}
