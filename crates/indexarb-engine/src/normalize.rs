//! Ratio normalization, spread series, and underlying divergence.
//!
//! sym2 trades at roughly `qty_ratio` times sym1, so comparing the two
//! sides means dividing sym2 prices by the day's open ratio first. All
//! joins are inner joins on timestamp over already-filtered inputs; an
//! empty join is a valid result the caller must handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use indexarb_data::UnderlyingFrame;

/// A (timestamp, price) sample of one contract or symbol.
pub type PricePoint = (DateTime<Utc>, f64);

/// One joined minute of the two option series, sym2 scaled down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadPoint {
    pub ts: DateTime<Utc>,
    pub sym1_price: f64,
    pub sym2_normalized: f64,
    /// sym2_normalized - sym1_price. Positive means sym2 is rich.
    pub spread: f64,
    /// Spread as a percentage of the sym1 price.
    pub spread_pct: f64,
}

/// One joined minute of the two underlying series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergencePoint {
    pub ts: DateTime<Utc>,
    pub close_sym1: f64,
    pub close_sym2: f64,
    /// Percent change from each series' first bar.
    pub pct_change_sym1: f64,
    pub pct_change_sym2: f64,
    /// pct_change_sym2 - pct_change_sym1.
    pub pct_gap: f64,
    /// sym2_close / qty_ratio - sym1_close.
    pub dollar_gap: f64,
}

/// Divide every price by `ratio`, keeping timestamps.
pub fn normalize_series(points: &[PricePoint], ratio: f64) -> Vec<PricePoint> {
    points.iter().map(|&(ts, p)| (ts, p / ratio)).collect()
}

/// Inner-join the two option price series on timestamp and compute the
/// per-minute spread with sym2 normalized by `ratio`.
///
/// Both inputs must be time-ordered; the output preserves that order.
pub fn spread_series(sym1: &[PricePoint], sym2: &[PricePoint], ratio: f64) -> Vec<SpreadPoint> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < sym1.len() && j < sym2.len() {
        let (t1, p1) = sym1[i];
        let (t2, p2) = sym2[j];
        if t1 < t2 {
            i += 1;
        } else if t2 < t1 {
            j += 1;
        } else {
            let normalized = p2 / ratio;
            let spread = normalized - p1;
            out.push(SpreadPoint {
                ts: t1,
                sym1_price: p1,
                sym2_normalized: normalized,
                spread,
                spread_pct: spread / p1 * 100.0,
            });
            i += 1;
            j += 1;
        }
    }
    out
}

/// Underlying price divergence between the two symbols of a pair.
///
/// Percent change is measured from each frame's first bar; the join is
/// inner on timestamp.
pub fn divergence(
    sym1: &UnderlyingFrame,
    sym2: &UnderlyingFrame,
    qty_ratio: u32,
) -> Vec<DivergencePoint> {
    let (Some(open1), Some(open2)) = (sym1.first(), sym2.first()) else {
        return Vec::new();
    };
    let open1 = open1.close;
    let open2 = open2.close;
    let ratio = f64::from(qty_ratio);

    let b1 = sym1.bars();
    let b2 = sym2.bars();
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < b1.len() && j < b2.len() {
        if b1[i].ts < b2[j].ts {
            i += 1;
        } else if b2[j].ts < b1[i].ts {
            j += 1;
        } else {
            let c1 = b1[i].close;
            let c2 = b2[j].close;
            let pct1 = (c1 - open1) / open1 * 100.0;
            let pct2 = (c2 - open2) / open2 * 100.0;
            out.push(DivergencePoint {
                ts: b1[i].ts,
                close_sym1: c1,
                close_sym2: c2,
                pct_change_sym1: pct1,
                pct_change_sym2: pct2,
                pct_gap: pct2 - pct1,
                dollar_gap: c2 / ratio - c1,
            });
            i += 1;
            j += 1;
        }
    }
    out
}
