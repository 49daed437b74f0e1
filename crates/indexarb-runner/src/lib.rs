//! Shared plumbing for the runner bins.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use indexarb_data::{list_dates, TradingDate};
use indexarb_models::config::qty_ratio_for;

/// Init tracing from `RUST_LOG`, defaulting to info.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Parse a `SYM1/SYM2` pair argument.
pub fn parse_pair(raw: &str) -> Result<(String, String)> {
    let Some((sym1, sym2)) = raw.split_once('/') else {
        bail!("pair must look like SPY/SPX, got {raw:?}");
    };
    let sym1 = sym1.trim().to_uppercase();
    let sym2 = sym2.trim().to_uppercase();
    if sym1.is_empty() || sym2.is_empty() {
        bail!("pair must look like SPY/SPX, got {raw:?}");
    }
    Ok((sym1, sym2))
}

/// Resolve an explicit date, or fall back to the most recent one with
/// data under `root`.
pub fn resolve_date(root: &Path, requested: Option<&str>) -> Result<TradingDate> {
    match requested {
        Some(raw) => TradingDate::new(raw).with_context(|| format!("bad --date {raw:?}")),
        None => {
            let dates = list_dates(root)?;
            dates
                .into_iter()
                .next()
                .with_context(|| format!("no trading dates under {}", root.display()))
        }
    }
}

/// Worker count for a scan: explicit, or half the cores with headroom.
pub fn scan_workers(requested: usize) -> usize {
    if requested > 0 {
        requested
    } else {
        (num_cpus::get() / 2).max(1)
    }
}

/// Sanity hint for pair arguments where the ratio looks off.
pub fn ratio_hint(sym2: &str, qty_ratio: u32) -> Option<String> {
    let expected = qty_ratio_for(sym2);
    (expected != qty_ratio).then(|| {
        format!("qty_ratio {qty_ratio} is unusual for {sym2} (expected {expected})")
    })
}
