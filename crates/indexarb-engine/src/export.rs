//! Machine-readable snapshot envelopes for the analytical views.
//!
//! Every user-visible analysis can be exported as one JSON document with
//! stable field names (`sym1_strike`, `credit`, `best_worst_case`,
//! `actual_outcome.pct_of_best_case`, ...). Downstream tooling depends on
//! those names; add fields, never rename.

use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use serde::Serialize;

use indexarb_models::{LegAction, Position, PriceQuote, PriceSource, Right, StrategyConfig};

use crate::pnl::BestWorstCase;
use crate::position::{EntryUnderlying, LegPrices};
use crate::settlement::{actual_outcome, ActualOutcome, SettlementReport};

/// Minute label in Eastern time, e.g. `10:30`.
pub fn et_minute_label(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&New_York).format("%H:%M").to_string()
}

/// Long label in Eastern time, e.g. `10:30 AM ET`.
pub fn et_time_label(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&New_York).format("%I:%M %p ET").to_string()
}

/// Underlying prices at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnderlyingPrices {
    pub sym1: f64,
    pub sym2: f64,
}

/// One leg's input price with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegPriceRecord {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    pub action: LegAction,
    pub quantity: u32,
    pub entry_price: f64,
    pub source: Option<PriceSource>,
    pub is_stale: Option<bool>,
}

/// Credit and margin block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditBlock {
    pub call_credit: f64,
    pub put_credit: f64,
    pub total_credit: f64,
    pub estimated_margin: f64,
}

/// One full analytical view, ready for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    /// Trading date, `yyyy-mm-dd`.
    pub date: String,
    pub entry_time: DateTime<Utc>,
    pub entry_time_label: String,
    pub config: StrategyConfig,
    pub sym1_strike: f64,
    pub sym2_strike: f64,
    pub entry_underlying: UnderlyingPrices,
    pub input_prices: Vec<LegPriceRecord>,
    pub terminal_underlying: UnderlyingPrices,
    pub credit: CreditBlock,
    pub best_worst_case: BestWorstCase,
    pub eod_settlement: SettlementReport,
    pub actual_outcome: ActualOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Assemble the export envelope for one analyzed position.
#[allow(clippy::too_many_arguments)]
pub fn analysis_snapshot(
    date: impl Into<String>,
    entry_time: DateTime<Utc>,
    config: &StrategyConfig,
    sym1_strike: f64,
    sym2_strike: f64,
    position: &Position,
    leg_prices: &LegPrices,
    entry: EntryUnderlying,
    grid: &BestWorstCase,
    eod: &SettlementReport,
) -> AnalysisSnapshot {
    let input_prices = position
        .legs
        .iter()
        .map(|leg| {
            let quote = quote_for(config, leg.symbol.as_str(), leg.right, leg_prices);
            LegPriceRecord {
                symbol: leg.symbol.clone(),
                strike: leg.strike,
                right: leg.right,
                action: leg.action,
                quantity: leg.quantity,
                entry_price: leg.entry_price,
                source: quote.map(|q| q.source),
                is_stale: quote.map(|q| q.is_stale),
            }
        })
        .collect();

    AnalysisSnapshot {
        date: date.into(),
        entry_time,
        entry_time_label: et_time_label(entry_time),
        config: config.clone(),
        sym1_strike,
        sym2_strike,
        entry_underlying: UnderlyingPrices {
            sym1: entry.sym1,
            sym2: entry.sym2,
        },
        input_prices,
        terminal_underlying: UnderlyingPrices {
            sym1: eod.terminal_sym1,
            sym2: eod.terminal_sym2,
        },
        credit: CreditBlock {
            call_credit: position.call_credit,
            put_credit: position.put_credit,
            total_credit: position.total_credit,
            estimated_margin: position.estimated_margin,
        },
        best_worst_case: grid.clone(),
        eod_settlement: eod.clone(),
        actual_outcome: actual_outcome(eod, &grid.best),
        warnings: position.warnings.clone(),
    }
}

fn quote_for<'a>(
    config: &StrategyConfig,
    symbol: &str,
    right: Right,
    prices: &'a LegPrices,
) -> Option<&'a PriceQuote> {
    let is_sym1 = symbol == config.sym1;
    match (right, is_sym1) {
        (Right::Call, true) => prices.sym1_call.as_ref(),
        (Right::Call, false) => prices.sym2_call.as_ref(),
        (Right::Put, true) => prices.sym1_put.as_ref(),
        (Right::Put, false) => prices.sym2_put.as_ref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_et_labels() {
        // 14:30 UTC in February is 09:30 Eastern.
        let ts = Utc.with_ymd_and_hms(2026, 2, 13, 14, 30, 0).unwrap();
        assert_eq!(et_minute_label(ts), "09:30");
        assert_eq!(et_time_label(ts), "09:30 AM ET");

        // DST: 14:30 UTC in June is 10:30 Eastern.
        let ts = Utc.with_ymd_and_hms(2026, 6, 12, 14, 30, 0).unwrap();
        assert_eq!(et_minute_label(ts), "10:30");
    }
}
