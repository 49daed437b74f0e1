//! Scan result records and the three ranking views.
//!
//! One scan run produces one frozen [`ScanOutcome`]; the safety, profit,
//! and risk/reward orderings are views over that single result set so
//! they are always mutually consistent.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::market::PriceSource;

/// Which side the scanner would sell at the observed spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    SellSym2,
    SellSym1,
}

/// Result from scanning a single strike pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub sym1_strike: f64,
    pub sym2_strike: f64,
    /// |moneyness(sym1) - moneyness(sym2)| in percent at the open.
    pub moneyness_diff_pct: f64,
    /// Largest |spread| observed across the day (sym1-scale dollars).
    pub max_spread: f64,
    pub max_spread_time: DateTime<Utc>,
    /// Credit implied at the max-spread minute, directed by the spread sign.
    pub credit_at_max: f64,
    /// Full-grid worst-case P&L at the candidate entry time.
    pub best_worst_pnl: f64,
    pub best_worst_time: DateTime<Utc>,
    pub direction: ScanDirection,
    pub sym1_volume: u64,
    pub sym2_volume: u64,
    pub price_source: PriceSource,
    pub liquidity_ok: bool,
    /// credit / |worst|; infinite when the worst case is non-negative.
    pub risk_reward: f64,
    /// min(best_worst_pnl, 0).
    pub max_risk: f64,
    /// Per-pair recoverable problem, recorded instead of aborting the scan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Ranking policy over one scan's result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// Highest full-grid worst-case P&L first.
    Safety,
    /// Highest credit first.
    Profit,
    /// Highest credit/|worst| first, non-negative worst ranking as infinite.
    RiskReward,
}

impl FromStr for RankBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safety" => Ok(RankBy::Safety),
            "profit" => Ok(RankBy::Profit),
            "risk_reward" | "risk-reward" => Ok(RankBy::RiskReward),
            other => Err(Error::InvalidArgument(format!(
                "unknown ranking: {other:?}"
            ))),
        }
    }
}

/// The frozen output of one scan run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// All viable pairs, sorted by safety.
    pub results: Vec<ScanResult>,
    /// Pairs dropped before producing a usable spread series.
    pub skipped: usize,
    /// True when the scan was cancelled; `results` is then empty.
    pub partial: bool,
}

impl ScanOutcome {
    /// One of the three total orderings over the result set.
    ///
    /// Ties on the primary key break by sym1 strike ascending, then sym2
    /// strike ascending, so repeated scans order identically.
    pub fn ranked(&self, by: RankBy) -> Vec<&ScanResult> {
        let mut view: Vec<&ScanResult> = self.results.iter().collect();
        view.sort_by(|a, b| compare(b, a, by).then_with(|| strike_order(a, b)));
        view
    }

    /// Reorder the owned result set in place under the same ordering.
    pub fn sort_results(&mut self, by: RankBy) {
        self.results
            .sort_by(|a, b| compare(b, a, by).then_with(|| strike_order(a, b)));
    }
}

fn compare(a: &ScanResult, b: &ScanResult, by: RankBy) -> Ordering {
    match by {
        RankBy::Safety => a.best_worst_pnl.total_cmp(&b.best_worst_pnl),
        RankBy::Profit => a.credit_at_max.total_cmp(&b.credit_at_max),
        RankBy::RiskReward => a.risk_reward.total_cmp(&b.risk_reward),
    }
}

fn strike_order(a: &ScanResult, b: &ScanResult) -> Ordering {
    a.sym1_strike
        .total_cmp(&b.sym1_strike)
        .then(a.sym2_strike.total_cmp(&b.sym2_strike))
}
