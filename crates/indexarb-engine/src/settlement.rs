//! End-of-day settlement against recorded closes.
//!
//! Where the grid search stresses hypothetical terminals, this settles a
//! position at the day's actual last underlying prices and relates the
//! outcome to the best case.

use serde::Serialize;

use indexarb_models::{Error, Position, Result, StrategyConfig};

use crate::pnl::{per_leg_pnl, settlement_value, LegOutcome, Scenario};

/// Per-leg settlement of a position at actual terminal prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub terminal_sym1: f64,
    pub terminal_sym2: f64,
    pub legs: Vec<LegOutcome>,
    pub net_pnl: f64,
}

/// Realized outcome relative to the grid's best case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualOutcome {
    pub net_pnl: f64,
    /// Realized P&L as a percentage of the best-case P&L, when the best
    /// case is positive.
    pub pct_of_best_case: Option<f64>,
}

/// Settle every leg of a position at the day's terminal prices.
pub fn eod_settlement(
    config: &StrategyConfig,
    position: &Position,
    terminal_sym1: f64,
    terminal_sym2: f64,
) -> Result<SettlementReport> {
    if terminal_sym1 <= 0.0 || terminal_sym2 <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "terminal prices must be positive, got {terminal_sym1}/{terminal_sym2}"
        )));
    }
    if position.legs.is_empty() {
        return Err(Error::PreconditionNotMet(
            "position has no legs to settle".into(),
        ));
    }

    let mut legs = Vec::with_capacity(position.legs.len());
    let mut net = 0.0;
    for leg in &position.legs {
        let underlying = if leg.symbol == config.sym1 {
            terminal_sym1
        } else {
            terminal_sym2
        };
        let settle = settlement_value(underlying, leg.strike, leg.right);
        let pnl = per_leg_pnl(leg, settle);
        net += pnl;
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

    Ok(SettlementReport {
        terminal_sym1,
        terminal_sym2,
        legs,
        net_pnl: net,
    })
}

/// Relate a settlement report to the grid's best case.
pub fn actual_outcome(report: &SettlementReport, best: &Scenario) -> ActualOutcome {
    let pct = if best.net_pnl > 0.0 {
        Some(report.net_pnl / best.net_pnl * 100.0)
    } else {
        None
    };
    ActualOutcome {
        net_pnl: report.net_pnl,
        pct_of_best_case: pct,
    }
}
