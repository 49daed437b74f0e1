//! Settlement values, per-leg P&L, and the best/worst grid search.
//!
//! Option prices are never modeled here; a leg's terminal value is its
//! settlement intrinsic. The grid search stresses two things at once:
//! the sym1 price across +/-5% of entry, and the sym2/sym1 basis across
//! three drift levels. 50 price points x 3 drifts = 150 scenarios,
//! evaluated in a fixed order so identical inputs give bit-identical
//! output.

use serde::Serialize;

use indexarb_models::config::{
    GRID_BASIS_DRIFT_LEVELS, GRID_PRICE_POINTS, GRID_PRICE_RANGE_PCT,
};
use indexarb_models::{
    Error, Leg, LegAction, Position, Result, Right, StrategyConfig, CONTRACT_MULTIPLIER,
};

/// Intrinsic value of an option at expiration.
pub fn settlement_value(underlying_price: f64, strike: f64, right: Right) -> f64 {
    match right {
        Right::Call => (underlying_price - strike).max(0.0),
        Right::Put => (strike - underlying_price).max(0.0),
    }
}

/// Cash P&L of one leg against a terminal option price.
///
/// For options held to expiration the terminal price is the settlement
/// intrinsic.
pub fn per_leg_pnl(leg: &Leg, terminal_price: f64) -> f64 {
    let qty = f64::from(leg.quantity) * CONTRACT_MULTIPLIER;
    match leg.action {
        LegAction::Buy => (terminal_price - leg.entry_price) * qty,
        LegAction::Sell => (leg.entry_price - terminal_price) * qty,
    }
}

/// One leg's settlement outcome inside a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegOutcome {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    pub action: LegAction,
    pub quantity: u32,
    pub entry_price: f64,
    pub settlement_value: f64,
    pub pnl: f64,
}

/// Credit and settlement-cost breakdown of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioBreakdown {
    pub call_credit: f64,
    pub put_credit: f64,
    pub total_credit: f64,
    /// Net cash owed at settlement on the call side (positive = owed).
    pub call_settlement_cost: f64,
    pub put_settlement_cost: f64,
    pub total_settlement_cost: f64,
    pub legs: Vec<LegOutcome>,
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub net_pnl: f64,
    pub sym1_price: f64,
    pub sym2_price: f64,
    /// Basis drift applied to the entry ratio, in percent.
    pub basis_drift_pct: f64,
    pub breakdown: ScenarioBreakdown,
}

/// Best and worst scenarios over the full grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWorstCase {
    pub best: Scenario,
    pub worst: Scenario,
    pub scenarios_evaluated: usize,
}

/// Run the 150-scenario grid search for a position.
///
/// The baseline sym2 price at each grid point is the entry ratio applied
/// to the trial sym1 price; drift models basis error around that ratio.
/// Ties keep the earliest scenario in grid order, so the result is
/// deterministic.
pub fn best_worst_case(
    config: &StrategyConfig,
    position: &Position,
    entry_sym1: f64,
    entry_sym2: f64,
) -> Result<BestWorstCase> {
    if entry_sym1 <= 0.0 || entry_sym2 <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "entry prices must be positive, got {entry_sym1}/{entry_sym2}"
        )));
    }
    if position.legs.is_empty() {
        return Err(Error::PreconditionNotMet(
            "position has no legs to evaluate".into(),
        ));
    }
    for leg in &position.legs {
        if leg.symbol != config.sym1 && leg.symbol != config.sym2 {
            return Err(Error::InvalidArgument(format!(
                "leg symbol {} is not part of pair {}/{}",
                leg.symbol, config.sym1, config.sym2
            )));
        }
    }

    let entry_ratio = entry_sym2 / entry_sym1;
    let lo = entry_sym1 * (1.0 - GRID_PRICE_RANGE_PCT);
    let hi = entry_sym1 * (1.0 + GRID_PRICE_RANGE_PCT);
    let step = (hi - lo) / (GRID_PRICE_POINTS - 1) as f64;

    let mut best: Option<Scenario> = None;
    let mut worst: Option<Scenario> = None;
    let mut best_pnl = f64::NEG_INFINITY;
    let mut worst_pnl = f64::INFINITY;
    let mut evaluated = 0usize;

    for i in 0..GRID_PRICE_POINTS {
        let s1 = lo + step * i as f64;
        for drift in GRID_BASIS_DRIFT_LEVELS {
            let s2 = s1 * entry_ratio * (1.0 + drift);
            let scenario = evaluate(config, position, s1, s2, drift * 100.0);
            evaluated += 1;

            if scenario.net_pnl > best_pnl {
                best_pnl = scenario.net_pnl;
                best = Some(scenario.clone());
            }
            if scenario.net_pnl < worst_pnl {
                worst_pnl = scenario.net_pnl;
                worst = Some(scenario);
            }
        }
    }

    // The grid is non-empty, so both ends exist.
    match (best, worst) {
        (Some(best), Some(worst)) => Ok(BestWorstCase {
            best,
            worst,
            scenarios_evaluated: evaluated,
        }),
        _ => Err(Error::PreconditionNotMet("empty scenario grid".into())),
    }
}

/// Settle every leg at one (s1, s2) grid point.
fn evaluate(
    config: &StrategyConfig,
    position: &Position,
    s1: f64,
    s2: f64,
    basis_drift_pct: f64,
) -> Scenario {
    let mut net = 0.0;
    let mut call_cost = 0.0;
    let mut put_cost = 0.0;
    let mut legs = Vec::with_capacity(position.legs.len());

    for leg in &position.legs {
        let underlying = if leg.symbol == config.sym1 { s1 } else { s2 };
        let settle = settlement_value(underlying, leg.strike, leg.right);
        let pnl = per_leg_pnl(leg, settle);
        net += pnl;

        let signed_cost = match leg.action {
            LegAction::Sell => settle * f64::from(leg.quantity) * CONTRACT_MULTIPLIER,
            LegAction::Buy => -settle * f64::from(leg.quantity) * CONTRACT_MULTIPLIER,
        };
        match leg.right {
            Right::Call => call_cost += signed_cost,
            Right::Put => put_cost += signed_cost,
        }

        legs.push(LegOutcome {
            symbol: leg.symbol.clone(),
            strike: leg.strike,
            right: leg.right,
            action: leg.action,
            quantity: leg.quantity,
            entry_price: leg.entry_price,
            settlement_value: settle,
            pnl,
        });
    }

    Scenario {
        net_pnl: net,
        sym1_price: s1,
        sym2_price: s2,
        basis_drift_pct,
        breakdown: ScenarioBreakdown {
            call_credit: position.call_credit,
            put_credit: position.put_credit,
            total_credit: position.total_credit,
            call_settlement_cost: call_cost,
            put_settlement_cost: put_cost,
            total_settlement_cost: call_cost + put_cost,
            legs,
        },
    }
}
