//! Integration tests for CSV loading and date enumeration.
//!
//! Exercises the real file formats: timezone-aware timestamps, missing
//! option sources, and malformed rows that must surface as
//! inconsistent-data errors.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use indexarb_data::{
    available_pairs, list_dates, load_option_quotes, load_option_trades, load_underlying,
    TradingDate,
};
use indexarb_models::{Error, Right};
use tempfile::TempDir;

fn write(root: &Path, name: &str, body: &str) {
    fs::write(root.join(name), body).unwrap();
}

fn seed_underlying(root: &Path, date: &str) {
    write(
        root,
        &format!("underlying_prices_{date}.csv"),
        "symbol,time,open,high,low,close,volume\n\
         SPY,2026-02-13 14:30:00+00:00,600.0,600.5,599.5,600.0,1000\n\
         SPY,2026-02-13 14:31:00+00:00,600.0,600.6,599.9,600.2,900\n\
         SPX,2026-02-13 14:30:00+00:00,6000.0,6005.0,5995.0,6000.0,0\n\
         SPX,2026-02-13 14:31:00+00:00,6000.0,6006.0,5999.0,6002.0,0\n",
    );
}

#[test]
fn test_list_dates_descending() {
    let dir = TempDir::new().unwrap();
    seed_underlying(dir.path(), "20260211");
    seed_underlying(dir.path(), "20260213");
    seed_underlying(dir.path(), "20260212");
    // Unrelated files are ignored.
    write(dir.path(), "options_data_20260213.csv", "symbol\n");
    write(dir.path(), "notes.txt", "n/a");

    let dates = list_dates(dir.path()).unwrap();
    let raw: Vec<&str> = dates.iter().map(|d| d.raw()).collect();
    assert_eq!(raw, vec!["20260213", "20260212", "20260211"]);
    assert_eq!(dates[0].dashed(), "2026-02-13");
}

#[test]
fn test_list_dates_on_missing_root_is_empty() {
    let dates = list_dates(Path::new("/nonexistent/indexarb-data")).unwrap();
    assert!(dates.is_empty());
}

#[test]
fn test_underlying_parses_utc_and_splits_frames() {
    let dir = TempDir::new().unwrap();
    seed_underlying(dir.path(), "20260213");

    let date = TradingDate::new("20260213").unwrap();
    let series = load_underlying(dir.path(), &date).unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(series.symbols(), vec!["SPX".to_string(), "SPY".to_string()]);

    let (spy, spx) = series.symbol_frames("SPY", "SPX");
    assert_eq!(spy.len(), 2);
    assert_eq!(spx.len(), 2);
    assert_eq!(
        spy.first().unwrap().ts,
        Utc.with_ymd_and_hms(2026, 2, 13, 14, 30, 0).unwrap()
    );
    assert_eq!(spx.last().unwrap().close, 6002.0);

    assert_eq!(available_pairs(&series), vec![("SPY", "SPX")]);
}

#[test]
fn test_missing_underlying_is_not_found() {
    let dir = TempDir::new().unwrap();
    let date = TradingDate::new("20260213").unwrap();
    match load_underlying(dir.path(), &date) {
        Err(Error::NotFound(_)) => {}
        other => panic!("expected not_found, got {other:?}"),
    }
}

#[test]
fn test_missing_option_sources_are_none() {
    let dir = TempDir::new().unwrap();
    let date = TradingDate::new("20260213").unwrap();
    assert!(load_option_trades(dir.path(), &date).unwrap().is_none());
    assert!(load_option_quotes(dir.path(), &date).unwrap().is_none());
}

#[test]
fn test_option_trades_round_trip() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "options_data_20260213.csv",
        "symbol,strike,right,time,open,high,low,close,volume\n\
         SPY,600,C,2026-02-13 14:30:00+00:00,2.40,2.45,2.35,2.42,120\n\
         SPY,600,C,2026-02-13 14:31:00+00:00,2.42,2.42,2.42,2.42,0\n\
         SPX,6000,P,2026-02-13 14:30:00+00:00,24.0,24.5,23.5,24.2,15\n",
    );

    let date = TradingDate::new("20260213").unwrap();
    let series = load_option_trades(dir.path(), &date).unwrap().unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.strikes_for("SPY"), vec![600.0]);

    let contract = series.contract("SPY", 600.0, Right::Call);
    assert_eq!(contract.total_volume(), 120);
    assert_eq!(contract.liquid_bars().len(), 1);
}

#[test]
fn test_crossed_quote_is_inconsistent() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "options_bidask_20260213.csv",
        "symbol,strike,right,time,bid,ask,midpoint\n\
         SPY,600,C,2026-02-13 14:30:00+00:00,2.50,2.40,2.45\n",
    );

    let date = TradingDate::new("20260213").unwrap();
    match load_option_quotes(dir.path(), &date) {
        Err(Error::InconsistentData(_)) => {}
        other => panic!("expected inconsistent_data, got {other:?}"),
    }
}

#[test]
fn test_negative_volume_is_inconsistent() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "underlying_prices_20260213.csv",
        "symbol,time,open,high,low,close,volume\n\
         SPY,2026-02-13 14:30:00+00:00,600.0,600.5,599.5,600.0,-5\n",
    );

    let date = TradingDate::new("20260213").unwrap();
    match load_underlying(dir.path(), &date) {
        Err(Error::InconsistentData(_)) => {}
        other => panic!("expected inconsistent_data, got {other:?}"),
    }
}

#[test]
fn test_naive_timestamps_assumed_utc() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "underlying_prices_20260213.csv",
        "symbol,time,open,high,low,close,volume\n\
         SPY,2026-02-13 14:30:00,600.0,600.5,599.5,600.0,1000\n",
    );

    let date = TradingDate::new("20260213").unwrap();
    let series = load_underlying(dir.path(), &date).unwrap();
    let frame = series.symbol_frame("SPY");
    assert_eq!(
        frame.first().unwrap().ts,
        Utc.with_ymd_and_hms(2026, 2, 13, 14, 30, 0).unwrap()
    );
}

#[test]
fn test_trading_date_validation() {
    assert!(TradingDate::new("20260213").is_ok());
    assert!(TradingDate::new("2026-02-13").is_err());
    assert!(TradingDate::new("202602").is_err());
}
