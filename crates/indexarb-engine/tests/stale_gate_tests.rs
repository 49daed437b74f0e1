//! End-to-end stale-price gate: a carried-forward print with no quote
//! behind it must stop position construction.

use chrono::{DateTime, TimeZone, Utc};
use indexarb_data::{OptionSeries, QuoteSeries};
use indexarb_engine::position::{build, EntryUnderlying, LegPrices};
use indexarb_engine::pricing::PriceLookup;
use indexarb_models::{
    Error, OptionBar, OptionQuoteBar, Right, SpreadDirection, StrategyConfig, StrategyKind,
};

fn ts(min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 13, 15, min, 0).unwrap()
}

fn bar(symbol: &str, strike: f64, min: u32, close: f64, volume: u64) -> OptionBar {
    OptionBar {
        symbol: symbol.into(),
        strike,
        right: Right::Call,
        ts: ts(min),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

fn config() -> StrategyConfig {
    StrategyConfig::new(
        "SPY",
        "SPX",
        10,
        5,
        StrategyKind::CallsOnly,
        SpreadDirection::SellSym2BuySym1,
        SpreadDirection::SellSym1BuySym2,
    )
    .unwrap()
}

#[test]
fn test_stale_trade_print_blocks_position() {
    // SPY 601 call: only a zero-volume print, and no quote rows at all.
    let trades = OptionSeries::new(vec![
        bar("SPY", 601.0, 0, 2.40, 0),
        bar("SPX", 6010.0, 0, 24.00, 25),
    ]);
    let lookup = PriceLookup::new(Some(&trades), None);
    let t = ts(5);

    let sym1_call = lookup.price_at("SPY", 601.0, Right::Call, t);
    assert!(sym1_call.as_ref().is_some_and(|q| q.is_stale));
    let sym2_call = lookup.price_at("SPX", 6010.0, Right::Call, t);
    assert!(sym2_call.as_ref().is_some_and(|q| !q.is_stale));

    let prices = LegPrices {
        sym1_call,
        sym2_call,
        ..Default::default()
    };
    let err = build(
        &config(),
        601.0,
        6010.0,
        &prices,
        EntryUnderlying {
            sym1: 600.0,
            sym2: 6000.0,
        },
    )
    .unwrap_err();

    match err {
        Error::PreconditionNotMet(msg) => {
            assert!(msg.contains("SPY call"), "should name the stale leg: {msg}");
        }
        other => panic!("expected precondition_not_met, got {other:?}"),
    }
}

#[test]
fn test_valid_quote_unblocks_same_print() {
    // Same zero-volume print, but a live two-sided quote at the query
    // minute makes the price executable.
    let trades = OptionSeries::new(vec![
        bar("SPY", 601.0, 0, 2.40, 0),
        bar("SPX", 6010.0, 0, 24.00, 25),
    ]);
    let quotes = QuoteSeries::new(vec![OptionQuoteBar {
        symbol: "SPY".into(),
        strike: 601.0,
        right: Right::Call,
        ts: ts(5),
        bid: 2.35,
        ask: 2.45,
        midpoint: 2.40,
    }]);
    let lookup = PriceLookup::new(Some(&trades), Some(&quotes));
    let t = ts(5);

    let prices = LegPrices {
        sym1_call: lookup.price_at("SPY", 601.0, Right::Call, t),
        sym2_call: lookup.price_at("SPX", 6010.0, Right::Call, t),
        ..Default::default()
    };
    let position = build(
        &config(),
        601.0,
        6010.0,
        &prices,
        EntryUnderlying {
            sym1: 600.0,
            sym2: 6000.0,
        },
    )
    .unwrap();
    assert_eq!(position.legs.len(), 2);
}
