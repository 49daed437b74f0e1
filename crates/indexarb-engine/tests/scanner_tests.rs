//! Scanner end-to-end: pair matching, liquidity filtering, ranking
//! consistency, determinism, parallel equivalence, and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use indexarb_data::{OptionSeries, QuoteSeries, UnderlyingSeries};
use indexarb_engine::scanner::{scan, scan_parallel, ScanInputs};
use indexarb_models::{
    Error, OptionBar, OptionQuoteBar, PriceSource, RankBy, Right, ScanDirection,
    SpreadDirection, StrategyConfig, StrategyKind, UnderlyingBar,
};

fn ts(min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 13, 14, 30 + min, 0).unwrap()
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

fn underlying() -> UnderlyingSeries {
    let mut bars = Vec::new();
    for m in 0..10u32 {
        bars.push(UnderlyingBar {
            symbol: "SPY".into(),
            ts: ts(m),
            open: 600.0,
            high: 601.0,
            low: 599.0,
            close: 600.0 + 0.1 * f64::from(m),
            volume: 1000,
        });
        bars.push(UnderlyingBar {
            symbol: "SPX".into(),
            ts: ts(m),
            open: 6000.0,
            high: 6010.0,
            low: 5990.0,
            close: 6000.0 + f64::from(m),
            volume: 0,
        });
    }
    UnderlyingSeries::new(bars)
}

fn option_bar(symbol: &str, strike: f64, min: u32, close: f64, volume: u64) -> OptionBar {
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

/// SPY 600 vs SPX 6000 (rich, viable) and SPX 6010 (two bars only).
fn trades() -> OptionSeries {
    let mut bars = Vec::new();
    for m in 0..10u32 {
        bars.push(option_bar("SPY", 600.0, m, 2.40, 20));
        bars.push(option_bar("SPX", 6000.0, m, 24.50, 15));
    }
    bars.push(option_bar("SPX", 6010.0, 0, 25.00, 15));
    bars.push(option_bar("SPX", 6010.0, 1, 25.00, 15));
    OptionSeries::new(bars)
}

#[test]
fn test_scan_finds_viable_pair_and_counts_skips() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let trades = trades();
    let cfg = config();
    let inputs = ScanInputs::new(Some(&trades), None, &spy, &spx, Right::Call, &cfg);

    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert!(!outcome.partial);
    // (600, 6000) viable; (600, 6010) joins only 2 bars.
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.skipped, 1);

    let r = &outcome.results[0];
    assert_eq!(r.sym1_strike, 600.0);
    assert_eq!(r.sym2_strike, 6000.0);
    assert_eq!(r.direction, ScanDirection::SellSym2);
    assert_eq!(r.price_source, PriceSource::Trade);
    assert!(r.liquidity_ok);
    assert_eq!(r.sym1_volume, 200);
    assert_eq!(r.sym2_volume, 150);

    // Spread constant at 24.50/10 - 2.40 = 0.05.
    assert!((r.max_spread - 0.05).abs() < 1e-9);
    // Credit at max spread: 24.50*100 - 2.40*10*100 = 50.
    assert!((r.credit_at_max - 50.0).abs() < 1e-9);
    // The full grid drags the worst case below zero.
    assert!(r.best_worst_pnl < 0.0);
    assert!(r.risk_reward > 0.0 && r.risk_reward.is_finite());
    assert_eq!(r.max_risk, r.best_worst_pnl);
    assert!(r.warning.is_none());
}

#[test]
fn test_scan_is_deterministic_and_parallel_matches() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let trades = trades();
    let cfg = config();
    let inputs = ScanInputs::new(Some(&trades), None, &spy, &spx, Right::Call, &cfg);

    let a = scan(&inputs, &AtomicBool::new(false)).unwrap();
    let b = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert_eq!(a, b);

    let p = scan_parallel(&inputs, &AtomicBool::new(false), 4).unwrap();
    assert_eq!(a, p);
}

#[test]
fn test_midpoint_upgrade_when_quotes_cover_trades() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let trades = trades();
    let mut quote_bars = Vec::new();
    for m in 0..10u32 {
        quote_bars.push(OptionQuoteBar {
            symbol: "SPY".into(),
            strike: 600.0,
            right: Right::Call,
            ts: ts(m),
            bid: 2.38,
            ask: 2.42,
            midpoint: 2.40,
        });
        quote_bars.push(OptionQuoteBar {
            symbol: "SPX".into(),
            strike: 6000.0,
            right: Right::Call,
            ts: ts(m),
            bid: 24.30,
            ask: 24.70,
            midpoint: 24.50,
        });
    }
    let quotes = QuoteSeries::new(quote_bars);
    let cfg = config();
    let inputs = ScanInputs::new(Some(&trades), Some(&quotes), &spy, &spx, Right::Call, &cfg);

    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert_eq!(outcome.results[0].price_source, PriceSource::Midpoint);
}

#[test]
fn test_quotes_only_scan_uses_midpoints() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let mut quote_bars = Vec::new();
    for m in 0..12u32 {
        quote_bars.push(OptionQuoteBar {
            symbol: "SPY".into(),
            strike: 600.0,
            right: Right::Call,
            ts: ts(m),
            bid: 2.38,
            ask: 2.42,
            midpoint: 2.40,
        });
        quote_bars.push(OptionQuoteBar {
            symbol: "SPX".into(),
            strike: 6000.0,
            right: Right::Call,
            ts: ts(m),
            bid: 24.30,
            ask: 24.70,
            midpoint: 24.50,
        });
    }
    let quotes = QuoteSeries::new(quote_bars);
    let cfg = config();
    let inputs = ScanInputs::new(None, Some(&quotes), &spy, &spx, Right::Call, &cfg);

    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].price_source, PriceSource::Midpoint);
    // Volume figures are valid-quote counts in quotes-only mode.
    assert_eq!(outcome.results[0].sym1_volume, 12);
}

#[test]
fn test_no_option_sources_is_precondition() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let cfg = config();
    let inputs = ScanInputs::new(None, None, &spy, &spx, Right::Call, &cfg);

    match scan(&inputs, &AtomicBool::new(false)) {
        Err(Error::PreconditionNotMet(_)) => {}
        other => panic!("expected precondition_not_met, got {other:?}"),
    }
}

#[test]
fn test_cancelled_scan_is_partial_and_empty() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    let trades = trades();
    let cfg = config();
    let inputs = ScanInputs::new(Some(&trades), None, &spy, &spx, Right::Call, &cfg);

    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Relaxed);
    let outcome = scan(&inputs, &cancel).unwrap();
    assert!(outcome.partial);
    assert!(outcome.results.is_empty());

    let outcome = scan_parallel(&inputs, &cancel, 2).unwrap();
    assert!(outcome.partial);
    assert!(outcome.results.is_empty());
}

#[test]
fn test_liquidity_floor_hides_thin_pairs() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    // Same shape as trades() but with volume 1 per bar on the SPX side:
    // total 10 < the default floor only if min_volume is raised above it.
    let mut bars = Vec::new();
    for m in 0..10u32 {
        bars.push(option_bar("SPY", 600.0, m, 2.40, 20));
        bars.push(option_bar("SPX", 6000.0, m, 24.50, 1));
    }
    let trades = OptionSeries::new(bars);
    let cfg = config();
    let mut inputs = ScanInputs::new(Some(&trades), None, &spy, &spx, Right::Call, &cfg);
    inputs.min_volume = 50;

    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.skipped, 1);

    // With the floor disabled the pair reports, flagged illiquid.
    inputs.hide_illiquid = false;
    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert!(!outcome.results[0].liquidity_ok);
}

#[test]
fn test_ranking_heads_are_consistent() {
    let under = underlying();
    let (spy, spx) = under.symbol_frames("SPY", "SPX");
    // Two viable pairs with different spreads so credits differ.
    let mut bars = Vec::new();
    for m in 0..10u32 {
        bars.push(option_bar("SPY", 600.0, m, 2.40, 20));
        bars.push(option_bar("SPX", 6000.0, m, 24.50, 15));
        bars.push(option_bar("SPY", 601.0, m, 2.00, 20));
        bars.push(option_bar("SPX", 6010.0, m, 21.00, 15));
    }
    let trades = OptionSeries::new(bars);
    let cfg = config();
    let inputs = ScanInputs::new(Some(&trades), None, &spy, &spx, Right::Call, &cfg);

    let outcome = scan(&inputs, &AtomicBool::new(false)).unwrap();
    assert!(outcome.results.len() >= 2);

    let safety = outcome.ranked(RankBy::Safety);
    let max_worst = outcome
        .results
        .iter()
        .map(|r| r.best_worst_pnl)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(safety[0].best_worst_pnl, max_worst);

    let profit = outcome.ranked(RankBy::Profit);
    let max_credit = outcome
        .results
        .iter()
        .map(|r| r.credit_at_max)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(profit[0].credit_at_max, max_credit);

    let rr = outcome.ranked(RankBy::RiskReward);
    let max_rr = outcome
        .results
        .iter()
        .map(|r| r.risk_reward)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(rr[0].risk_reward, max_rr);

    // The stored set itself is the safety ordering.
    assert_eq!(outcome.results[0].best_worst_pnl, max_worst);
}
