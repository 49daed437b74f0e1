//! Strike-pair scanner.
//!
//! Enumerates every sym1/sym2 strike pair within tolerance of the day's
//! open ratio, scores each pair's spread series with a quick worst-case
//! heuristic, then runs the full grid search at the best candidate entry
//! minute. One scan produces one frozen result set; the three ranking
//! views are derived from it afterwards.
//!
//! ## Parallelism and determinism
//! Pairs are independent (immutable series in, one result out), so a scan
//! may fan out across a rayon pool. The final ordering always comes from
//! an explicit sort, never from completion order, and each pair's grid
//! runs sequentially, so repeated scans of the same inputs are identical.
//!
//! ## Cancellation
//! The token is checked at the start of every pair and again after each
//! per-pair grid search. A cancelled scan reports `partial = true` and
//! carries no results.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use indexarb_data::{OptionSeries, QuoteSeries, UnderlyingFrame};
use indexarb_models::config::{
    DEFAULT_MIN_VOLUME, GRID_BASIS_DRIFT_PCT, SCANNER_PAIR_TOLERANCE,
};
use indexarb_models::{
    Error, Leg, LegAction, PriceSource, RankBy, Result, Right, ScanDirection, ScanOutcome,
    ScanResult, StrategyConfig, StrategyKind, CONTRACT_MULTIPLIER,
};

use crate::normalize::{spread_series, PricePoint, SpreadPoint};
use crate::pnl;
use crate::position::{assemble, moneyness_pct};

/// Everything one scan needs. Series are shared immutably; two scans may
/// run over the same data concurrently.
#[derive(Debug, Clone, Copy)]
pub struct ScanInputs<'a> {
    pub trades: Option<&'a OptionSeries>,
    pub quotes: Option<&'a QuoteSeries>,
    pub sym1_frame: &'a UnderlyingFrame,
    pub sym2_frame: &'a UnderlyingFrame,
    pub right: Right,
    pub config: &'a StrategyConfig,
    /// Minimum total daily volume per contract.
    pub min_volume: u64,
    /// Skip pairs below `min_volume` instead of reporting them.
    pub hide_illiquid: bool,
}

impl<'a> ScanInputs<'a> {
    /// Inputs with the default liquidity floor.
    pub fn new(
        trades: Option<&'a OptionSeries>,
        quotes: Option<&'a QuoteSeries>,
        sym1_frame: &'a UnderlyingFrame,
        sym2_frame: &'a UnderlyingFrame,
        right: Right,
        config: &'a StrategyConfig,
    ) -> Self {
        Self {
            trades,
            quotes,
            sym1_frame,
            sym2_frame,
            right,
            config,
            min_volume: DEFAULT_MIN_VOLUME,
            hide_illiquid: true,
        }
    }
}

/// All sym1/sym2 strike pairs within `tolerance` of the open ratio.
///
/// For each sym1 strike the admissible sym2 strikes satisfy
/// `|s2 - s1 * ratio| / (s1 * ratio) <= tolerance`.
pub fn match_strike_pairs(
    sym1_strikes: &[f64],
    sym2_strikes: &[f64],
    open_ratio: f64,
    tolerance: f64,
) -> Vec<(f64, f64)> {
    let mut pairs = Vec::new();
    for &s1 in sym1_strikes {
        let target = s1 * open_ratio;
        if target <= 0.0 {
            continue;
        }
        for &s2 in sym2_strikes {
            if (s2 - target).abs() / target <= tolerance {
                pairs.push((s1, s2));
            }
        }
    }
    pairs
}

/// Quick worst-case P&L per minute of a spread series.
///
/// A scalar heuristic used to pick the candidate entry minute (and for
/// overlay display); the reported worst case always comes from the full
/// grid search.
pub fn quick_worst_case_series(
    merged: &[SpreadPoint],
    open_ratio: f64,
    sym1_strike: f64,
    qty_ratio: u32,
    moneyness_diff_pct: f64,
) -> Vec<(DateTime<Utc>, f64)> {
    let qr = f64::from(qty_ratio);
    let basis_cost = open_ratio * GRID_BASIS_DRIFT_PCT * sym1_strike * qr * CONTRACT_MULTIPLIER;
    let moneyness_cost =
        moneyness_diff_pct / 100.0 * sym1_strike * qr * CONTRACT_MULTIPLIER;
    merged
        .iter()
        .map(|p| {
            let credit = p.spread.abs() * qr * CONTRACT_MULTIPLIER;
            (p.ts, credit - basis_cost - moneyness_cost)
        })
        .collect()
}

/// Scan every admissible pair sequentially.
pub fn scan(inputs: &ScanInputs<'_>, cancel: &AtomicBool) -> Result<ScanOutcome> {
    let prep = prepare(inputs)?;
    debug!(
        pairs = prep.pairs.len(),
        right = %inputs.right,
        open_ratio = prep.open_ratio,
        "scanning strike pairs"
    );

    let mut results = Vec::new();
    let mut skipped = 0usize;
    for &pair in &prep.pairs {
        if cancel.load(Ordering::Relaxed) {
            return Ok(cancelled_outcome());
        }
        match scan_pair(inputs, &prep, pair) {
            Some(result) => results.push(result),
            None => skipped += 1,
        }
        if cancel.load(Ordering::Relaxed) {
            return Ok(cancelled_outcome());
        }
    }

    Ok(finish(results, skipped))
}

/// Scan pairs across a worker pool. `workers = 0` lets the pool size
/// itself to the machine.
pub fn scan_parallel(
    inputs: &ScanInputs<'_>,
    cancel: &AtomicBool,
    workers: usize,
) -> Result<ScanOutcome> {
    let prep = prepare(inputs)?;
    debug!(
        pairs = prep.pairs.len(),
        workers,
        "scanning strike pairs in parallel"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::InvalidArgument(format!("failed to build scan pool: {e}")))?;

    let scanned: Vec<Option<ScanResult>> = pool.install(|| {
        prep.pairs
            .par_iter()
            .map(|&pair| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let result = scan_pair(inputs, &prep, pair);
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                result
            })
            .collect()
    });

    if cancel.load(Ordering::Relaxed) {
        return Ok(cancelled_outcome());
    }

    let mut results = Vec::new();
    let mut skipped = 0usize;
    for item in scanned {
        match item {
            Some(result) => results.push(result),
            None => skipped += 1,
        }
    }
    Ok(finish(results, skipped))
}

fn cancelled_outcome() -> ScanOutcome {
    ScanOutcome {
        results: Vec::new(),
        skipped: 0,
        partial: true,
    }
}

fn finish(results: Vec<ScanResult>, skipped: usize) -> ScanOutcome {
    let mut outcome = ScanOutcome {
        results,
        skipped,
        partial: false,
    };
    outcome.sort_results(RankBy::Safety);
    outcome
}

struct ScanPrep {
    open_sym1: f64,
    open_sym2: f64,
    open_ratio: f64,
    pairs: Vec<(f64, f64)>,
}

fn prepare(inputs: &ScanInputs<'_>) -> Result<ScanPrep> {
    let cfg = inputs.config;
    let open1 = inputs.sym1_frame.first().ok_or_else(|| {
        Error::PreconditionNotMet(format!("no underlying bars for {}", cfg.sym1))
    })?;
    let open2 = inputs.sym2_frame.first().ok_or_else(|| {
        Error::PreconditionNotMet(format!("no underlying bars for {}", cfg.sym2))
    })?;
    if open1.close <= 0.0 || open2.close <= 0.0 {
        return Err(Error::InconsistentData(format!(
            "non-positive underlying open close: {}={} {}={}",
            cfg.sym1, open1.close, cfg.sym2, open2.close
        )));
    }

    let (sym1_strikes, sym2_strikes) = match (inputs.trades, inputs.quotes) {
        (Some(trades), _) => (
            trades.strikes_for(&cfg.sym1),
            trades.strikes_for(&cfg.sym2),
        ),
        (None, Some(quotes)) => (
            quotes.strikes_for(&cfg.sym1),
            quotes.strikes_for(&cfg.sym2),
        ),
        (None, None) => {
            return Err(Error::PreconditionNotMet(
                "no option data sources for scan".into(),
            ))
        }
    };

    let open_ratio = open2.close / open1.close;
    let pairs = match_strike_pairs(
        &sym1_strikes,
        &sym2_strikes,
        open_ratio,
        SCANNER_PAIR_TOLERANCE,
    );

    Ok(ScanPrep {
        open_sym1: open1.close,
        open_sym2: open2.close,
        open_ratio,
        pairs,
    })
}

/// Scan one strike pair; `None` means the pair never produced a usable
/// spread series.
fn scan_pair(
    inputs: &ScanInputs<'_>,
    prep: &ScanPrep,
    (sym1_strike, sym2_strike): (f64, f64),
) -> Option<ScanResult> {
    let cfg = inputs.config;
    let qr = f64::from(cfg.qty_ratio);

    let sides = pair_price_points(inputs, sym1_strike, sym2_strike)?;

    let merged = spread_series(&sides.sym1_points, &sides.sym2_points, prep.open_ratio);
    if merged.len() < 5 {
        debug!(
            sym1_strike,
            sym2_strike,
            joined = merged.len(),
            "pair skipped: too few joined bars"
        );
        return None;
    }

    let m1 = moneyness_pct(sym1_strike, prep.open_sym1);
    let m2 = moneyness_pct(sym2_strike, prep.open_sym2);
    let moneyness_diff_pct = (m1 - m2).abs();

    let quick = quick_worst_case_series(
        &merged,
        prep.open_ratio,
        sym1_strike,
        cfg.qty_ratio,
        moneyness_diff_pct,
    );

    // First occurrence wins on ties for both argmaxes.
    let mut max_idx = 0;
    let mut star_idx = 0;
    for i in 1..merged.len() {
        if merged[i].spread.abs() > merged[max_idx].spread.abs() {
            max_idx = i;
        }
        if quick[i].1 > quick[star_idx].1 {
            star_idx = i;
        }
    }
    let max_row = &merged[max_idx];
    let t_star = merged[star_idx].ts;

    let direction = if max_row.spread > 0.0 {
        ScanDirection::SellSym2
    } else {
        ScanDirection::SellSym1
    };

    // Credit implied at the max-spread minute, from raw (unscaled) prices.
    let sym2_at_max = price_at_ts(&sides.sym2_points, max_row.ts)?;
    let credit_at_max = if max_row.spread > 0.0 {
        sym2_at_max * CONTRACT_MULTIPLIER - max_row.sym1_price * qr * CONTRACT_MULTIPLIER
    } else {
        max_row.sym1_price * qr * CONTRACT_MULTIPLIER - sym2_at_max * CONTRACT_MULTIPLIER
    };

    // Full grid search at the candidate entry minute.
    let opt1 = price_at_ts(&sides.sym1_points, t_star);
    let opt2 = price_at_ts(&sides.sym2_points, t_star);
    let under1 = inputs.sym1_frame.at_or_before(t_star).map(|b| b.close);
    let under2 = inputs.sym2_frame.at_or_before(t_star).map(|b| b.close);

    let (best_worst_pnl, warning) = match (opt1, opt2, under1, under2) {
        (Some(o1), Some(o2), Some(u1), Some(u2)) if u1 > 0.0 && u2 > 0.0 => {
            match grid_worst(cfg, inputs.right, direction, sym1_strike, sym2_strike, o1, o2, u1, u2)
            {
                Ok(worst) => (worst, None),
                Err(e) => (quick[star_idx].1, Some(format!("grid search failed: {e}"))),
            }
        }
        _ => (
            quick[star_idx].1,
            Some("no underlying price at candidate entry time".to_string()),
        ),
    };

    let risk_reward = if best_worst_pnl >= 0.0 {
        f64::INFINITY
    } else {
        credit_at_max / best_worst_pnl.abs()
    };

    Some(ScanResult {
        sym1_strike,
        sym2_strike,
        moneyness_diff_pct,
        max_spread: max_row.spread.abs(),
        max_spread_time: max_row.ts,
        credit_at_max,
        best_worst_pnl,
        best_worst_time: t_star,
        direction,
        sym1_volume: sides.sym1_volume,
        sym2_volume: sides.sym2_volume,
        price_source: sides.source,
        liquidity_ok: sides.sym1_volume >= inputs.min_volume
            && sides.sym2_volume >= inputs.min_volume,
        risk_reward,
        max_risk: best_worst_pnl.min(0.0),
        warning,
    })
}

struct PairSides {
    sym1_points: Vec<PricePoint>,
    sym2_points: Vec<PricePoint>,
    sym1_volume: u64,
    sym2_volume: u64,
    source: PriceSource,
}

/// Liquidity-filtered price series for both contracts of a pair.
///
/// With trades present, bars with volume 0 are dropped and quote
/// midpoints are preferred at minutes that actually traded. With quotes
/// only, valid two-sided rows stand in and their count doubles as the
/// volume figure.
fn pair_price_points(
    inputs: &ScanInputs<'_>,
    sym1_strike: f64,
    sym2_strike: f64,
) -> Option<PairSides> {
    let cfg = inputs.config;

    if let Some(trades) = inputs.trades {
        let c1 = trades.contract(&cfg.sym1, sym1_strike, inputs.right);
        let c2 = trades.contract(&cfg.sym2, sym2_strike, inputs.right);
        if c1.is_empty() || c2.is_empty() {
            return None;
        }
        let vol1 = c1.total_volume();
        let vol2 = c2.total_volume();
        if inputs.hide_illiquid && (vol1 < inputs.min_volume || vol2 < inputs.min_volume) {
            return None;
        }
        let liquid1 = c1.liquid_bars();
        let liquid2 = c2.liquid_bars();
        if liquid1.is_empty() || liquid2.is_empty() {
            return None;
        }

        if let Some(quotes) = inputs.quotes {
            let times1: HashSet<DateTime<Utc>> = liquid1.iter().map(|b| b.ts).collect();
            let times2: HashSet<DateTime<Utc>> = liquid2.iter().map(|b| b.ts).collect();
            let q1: Vec<PricePoint> = quotes
                .contract(&cfg.sym1, sym1_strike, inputs.right)
                .valid_bars()
                .iter()
                .filter(|q| times1.contains(&q.ts))
                .map(|q| (q.ts, q.midpoint))
                .collect();
            let q2: Vec<PricePoint> = quotes
                .contract(&cfg.sym2, sym2_strike, inputs.right)
                .valid_bars()
                .iter()
                .filter(|q| times2.contains(&q.ts))
                .map(|q| (q.ts, q.midpoint))
                .collect();
            if !q1.is_empty() && !q2.is_empty() {
                return Some(PairSides {
                    sym1_points: q1,
                    sym2_points: q2,
                    sym1_volume: vol1,
                    sym2_volume: vol2,
                    source: PriceSource::Midpoint,
                });
            }
        }

        return Some(PairSides {
            sym1_points: liquid1.iter().map(|b| (b.ts, b.close)).collect(),
            sym2_points: liquid2.iter().map(|b| (b.ts, b.close)).collect(),
            sym1_volume: vol1,
            sym2_volume: vol2,
            source: PriceSource::Trade,
        });
    }

    let quotes = inputs.quotes?;
    let q1: Vec<PricePoint> = quotes
        .contract(&cfg.sym1, sym1_strike, inputs.right)
        .valid_bars()
        .iter()
        .map(|q| (q.ts, q.midpoint))
        .collect();
    let q2: Vec<PricePoint> = quotes
        .contract(&cfg.sym2, sym2_strike, inputs.right)
        .valid_bars()
        .iter()
        .map(|q| (q.ts, q.midpoint))
        .collect();
    let vol1 = q1.len() as u64;
    let vol2 = q2.len() as u64;
    if q1.is_empty() || q2.is_empty() {
        return None;
    }
    if inputs.hide_illiquid && (vol1 < inputs.min_volume || vol2 < inputs.min_volume) {
        return None;
    }
    Some(PairSides {
        sym1_points: q1,
        sym2_points: q2,
        sym1_volume: vol1,
        sym2_volume: vol2,
        source: PriceSource::Midpoint,
    })
}

fn price_at_ts(points: &[PricePoint], ts: DateTime<Utc>) -> Option<f64> {
    points
        .binary_search_by(|p| p.0.cmp(&ts))
        .ok()
        .map(|i| points[i].1)
}

/// Build the correctly-directed two-legged position for a pair and run
/// the full grid, returning the worst net P&L.
#[allow(clippy::too_many_arguments)]
fn grid_worst(
    config: &StrategyConfig,
    right: Right,
    direction: ScanDirection,
    sym1_strike: f64,
    sym2_strike: f64,
    sym1_price: f64,
    sym2_price: f64,
    under1: f64,
    under2: f64,
) -> Result<f64> {
    let kind = match right {
        Right::Call => StrategyKind::CallsOnly,
        Right::Put => StrategyKind::PutsOnly,
    };
    let legs = match direction {
        ScanDirection::SellSym2 => vec![
            Leg::new(&config.sym2, sym2_strike, right, LegAction::Sell, 1, sym2_price)?,
            Leg::new(
                &config.sym1,
                sym1_strike,
                right,
                LegAction::Buy,
                config.qty_ratio,
                sym1_price,
            )?,
        ],
        ScanDirection::SellSym1 => vec![
            Leg::new(
                &config.sym1,
                sym1_strike,
                right,
                LegAction::Sell,
                config.qty_ratio,
                sym1_price,
            )?,
            Leg::new(&config.sym2, sym2_strike, right, LegAction::Buy, 1, sym2_price)?,
        ],
    };
    let position = assemble(kind, legs);
    let grid = pnl::best_worst_case(config, &position, under1, under2)?;
    Ok(grid.worst.net_pnl)
}
