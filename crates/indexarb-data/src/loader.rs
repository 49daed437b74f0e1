//! CSV loaders and date enumeration.
//!
//! Rows are deserialized into raw records first, then validated and
//! converted into the typed bars of `indexarb-models`. Validation failures
//! surface as `inconsistent_data`; a missing underlying file surfaces as
//! `not_found`. Missing option files are not errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use indexarb_models::config::SYMBOL_PAIRS;
use indexarb_models::{
    Error, OptionBar, OptionQuoteBar, Result, Right, UnderlyingBar,
};

use crate::series::{OptionSeries, QuoteSeries, UnderlyingSeries};

const UNDERLYING_PREFIX: &str = "underlying_prices_";
const TRADES_PREFIX: &str = "options_data_";
const BIDASK_PREFIX: &str = "options_bidask_";

/// A trading date in `yyyymmdd` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradingDate(String);

impl TradingDate {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "trading date must be yyyymmdd, got {raw:?}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// `yyyy-mm-dd` display form.
    pub fn dashed(&self) -> String {
        format!("{}-{}-{}", &self.0[..4], &self.0[4..6], &self.0[6..])
    }
}

impl std::fmt::Display for TradingDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dashed())
    }
}

/// Trading dates with underlying data under `root`, most recent first.
pub fn list_dates(root: &Path) -> Result<Vec<TradingDate>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return Ok(Vec::new()),
    };

    let mut dates = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(stem) = name
            .strip_prefix(UNDERLYING_PREFIX)
            .and_then(|rest| rest.strip_suffix(".csv"))
        {
            if let Ok(date) = TradingDate::new(stem) {
                dates.push(date);
            }
        }
    }
    dates.sort();
    dates.reverse();
    Ok(dates)
}

/// Symbol pairs from the registry for which both symbols have underlying
/// bars in the loaded day.
pub fn available_pairs(underlying: &UnderlyingSeries) -> Vec<(&'static str, &'static str)> {
    let symbols = underlying.symbols();
    SYMBOL_PAIRS
        .iter()
        .filter(|(s1, s2)| {
            symbols.iter().any(|s| s == s1) && symbols.iter().any(|s| s == s2)
        })
        .copied()
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawUnderlyingRow {
    symbol: String,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct RawOptionRow {
    symbol: String,
    strike: f64,
    right: String,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct RawQuoteRow {
    symbol: String,
    strike: f64,
    right: String,
    time: String,
    bid: f64,
    ask: f64,
    midpoint: f64,
}

/// Load underlying bars for a date. The file must exist.
pub fn load_underlying(root: &Path, date: &TradingDate) -> Result<UnderlyingSeries> {
    let path = data_path(root, UNDERLYING_PREFIX, date);
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "underlying price data not found: {}",
            path.display()
        )));
    }

    let mut bars = Vec::new();
    for row in read_rows::<RawUnderlyingRow>(&path)? {
        let row = row?;
        bars.push(UnderlyingBar {
            ts: parse_utc(&row.time, &path)?,
            volume: parse_volume(row.volume, &path)?,
            symbol: row.symbol,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }
    debug!(path = %path.display(), bars = bars.len(), "loaded underlying bars");
    Ok(UnderlyingSeries::new(bars))
}

/// Load option trade bars for a date, or `None` when the file is absent.
pub fn load_option_trades(root: &Path, date: &TradingDate) -> Result<Option<OptionSeries>> {
    let path = data_path(root, TRADES_PREFIX, date);
    if !path.exists() {
        return Ok(None);
    }

    let mut bars = Vec::new();
    for row in read_rows::<RawOptionRow>(&path)? {
        let row = row?;
        bars.push(OptionBar {
            ts: parse_utc(&row.time, &path)?,
            right: parse_right(&row.right, &path)?,
            volume: parse_volume(row.volume, &path)?,
            symbol: row.symbol,
            strike: row.strike,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        });
    }
    debug!(path = %path.display(), bars = bars.len(), "loaded option trade bars");
    Ok(Some(OptionSeries::new(bars)))
}

/// Load option bid/ask bars for a date, or `None` when the file is absent.
pub fn load_option_quotes(root: &Path, date: &TradingDate) -> Result<Option<QuoteSeries>> {
    let path = data_path(root, BIDASK_PREFIX, date);
    if !path.exists() {
        return Ok(None);
    }

    let mut bars = Vec::new();
    for row in read_rows::<RawQuoteRow>(&path)? {
        let row = row?;
        if row.bid > row.ask && row.ask > 0.0 {
            return Err(Error::InconsistentData(format!(
                "{}: bid {} above ask {} for {} {} {}",
                path.display(),
                row.bid,
                row.ask,
                row.symbol,
                row.strike,
                row.right
            )));
        }
        bars.push(OptionQuoteBar {
            ts: parse_utc(&row.time, &path)?,
            right: parse_right(&row.right, &path)?,
            symbol: row.symbol,
            strike: row.strike,
            bid: row.bid,
            ask: row.ask,
            midpoint: row.midpoint,
        });
    }
    debug!(path = %path.display(), bars = bars.len(), "loaded option quote bars");
    Ok(Some(QuoteSeries::new(bars)))
}

fn data_path(root: &Path, prefix: &str, date: &TradingDate) -> PathBuf {
    root.join(format!("{prefix}{}.csv", date.raw()))
}

fn read_rows<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<impl Iterator<Item = Result<T>>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::NotFound(format!("{}: {e}", path.display())))?;

    let display = path.display().to_string();
    Ok(reader.into_deserialize::<T>().map(move |row| {
        row.map_err(|e| Error::InconsistentData(format!("{display}: {e}")))
    }))
}

/// Parse a timestamp as UTC.
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S%:z`, and naive
/// `%Y-%m-%d %H:%M:%S` (taken to already be UTC).
fn parse_utc(s: &str, path: &Path) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(Error::InconsistentData(format!(
        "{}: unparseable timestamp {s:?}",
        path.display()
    )))
}

fn parse_right(s: &str, path: &Path) -> Result<Right> {
    Right::from_str(s).map_err(|_| {
        Error::InconsistentData(format!(
            "{}: unknown option right {s:?}",
            path.display()
        ))
    })
}

fn parse_volume(v: f64, path: &Path) -> Result<u64> {
    if !v.is_finite() || v < 0.0 {
        return Err(Error::InconsistentData(format!(
            "{}: negative volume {v}",
            path.display()
        )));
    }
    Ok(v as u64)
}
