//! Grid-search and settlement scenarios.
//!
//! These mirror the canonical hedge examples: a flat-market zero-credit
//! hedge, lockstep moves that cancel leg-for-leg, a positive-credit
//! entry, and the stress grid around it.

use indexarb_engine::pnl::{best_worst_case, per_leg_pnl, settlement_value};
use indexarb_engine::position::assemble;
use indexarb_engine::settlement::eod_settlement;
use indexarb_models::{
    Leg, LegAction, Position, Right, SpreadDirection, StrategyConfig, StrategyKind,
};

fn spy_spx_config(kind: StrategyKind) -> StrategyConfig {
    StrategyConfig::new(
        "SPY",
        "SPX",
        10,
        5,
        kind,
        SpreadDirection::SellSym2BuySym1,
        SpreadDirection::SellSym1BuySym2,
    )
    .unwrap()
}

fn call_hedge(sell_price: f64, buy_price: f64) -> Position {
    assemble(
        StrategyKind::CallsOnly,
        vec![
            Leg::new("SPX", 6000.0, Right::Call, LegAction::Sell, 1, sell_price).unwrap(),
            Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 10, buy_price).unwrap(),
        ],
    )
}

#[test]
fn test_flat_market_zero_credit_hedge() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    let position = call_hedge(24.00, 2.40);
    assert_eq!(position.total_credit, 0.0);

    let report = eod_settlement(&config, &position, 600.0, 6000.0).unwrap();
    assert_eq!(report.legs[0].settlement_value, 0.0);
    assert_eq!(report.legs[1].settlement_value, 0.0);
    assert_eq!(report.net_pnl, 0.0);
}

#[test]
fn test_one_percent_lockstep_nets_to_zero() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    let position = call_hedge(24.00, 2.40);

    // Call settlements: SPY max(0, 606-600)=6, SPX max(0, 6060-6000)=60.
    let report = eod_settlement(&config, &position, 606.0, 6060.0).unwrap();
    let sell_leg = &report.legs[0];
    let buy_leg = &report.legs[1];
    assert_eq!(sell_leg.settlement_value, 60.0);
    assert_eq!(sell_leg.pnl, -3600.0);
    assert_eq!(buy_leg.settlement_value, 6.0);
    assert_eq!(buy_leg.pnl, 3600.0);
    assert!((report.net_pnl).abs() < 1e-9);
}

#[test]
fn test_positive_credit_entry_keeps_credit_in_lockstep() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    // SPX overpriced at entry: credit 2500 - 2400 = 100.
    let position = call_hedge(25.00, 2.40);
    assert_eq!(position.total_credit, 100.0);

    let report = eod_settlement(&config, &position, 606.0, 6060.0).unwrap();
    assert!((report.net_pnl - 100.0).abs() < 1e-9);
}

#[test]
fn test_grid_brackets_credit_and_worst_hits_drifted_extreme() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    let position = call_hedge(25.00, 2.40);

    let grid = best_worst_case(&config, &position, 600.0, 6000.0).unwrap();
    assert_eq!(grid.scenarios_evaluated, 150);

    assert!(grid.best.net_pnl >= 100.0);
    assert!(grid.worst.net_pnl <= 100.0);

    // Worst case: sym1 rallies to the top of the range while the basis
    // drifts against the short sym2 call.
    assert!((grid.worst.sym1_price - 630.0).abs() < 1e-6);
    assert!((grid.worst.basis_drift_pct - 0.1).abs() < 1e-9);
    assert!(grid.worst.net_pnl < 0.0);

    // Breakdown stays internally consistent: net = credit - settlement cost.
    let b = &grid.worst.breakdown;
    assert!((b.total_credit - 100.0).abs() < 1e-9);
    assert!(
        (grid.worst.net_pnl - (b.total_credit - b.total_settlement_cost)).abs() < 1e-6
    );
}

#[test]
fn test_grid_is_deterministic() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    let position = call_hedge(25.00, 2.40);

    let a = best_worst_case(&config, &position, 600.0, 6000.0).unwrap();
    let b = best_worst_case(&config, &position, 600.0, 6000.0).unwrap();
    // Bit-identical, breakdowns included.
    assert_eq!(a, b);
}

#[test]
fn test_full_position_uses_same_grid() {
    let config = spy_spx_config(StrategyKind::Full);
    let legs = vec![
        Leg::new("SPX", 6000.0, Right::Call, LegAction::Sell, 1, 25.0).unwrap(),
        Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 10, 2.40).unwrap(),
        Leg::new("SPY", 600.0, Right::Put, LegAction::Sell, 10, 2.10).unwrap(),
        Leg::new("SPX", 6000.0, Right::Put, LegAction::Buy, 1, 20.0).unwrap(),
    ];
    let position = assemble(StrategyKind::Full, legs);

    let grid = best_worst_case(&config, &position, 600.0, 6000.0).unwrap();
    assert_eq!(grid.scenarios_evaluated, 150);
    assert_eq!(grid.worst.breakdown.legs.len(), 4);
}

#[test]
fn test_lockstep_property_pnl_equals_credit() {
    // When the terminal ratio equals the entry ratio, a ratio-matched
    // hedge keeps exactly its entry credit.
    let config = spy_spx_config(StrategyKind::Full);
    let legs = vec![
        Leg::new("SPX", 6000.0, Right::Call, LegAction::Sell, 1, 25.0).unwrap(),
        Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 10, 2.40).unwrap(),
        Leg::new("SPY", 600.0, Right::Put, LegAction::Sell, 10, 2.10).unwrap(),
        Leg::new("SPX", 6000.0, Right::Put, LegAction::Buy, 1, 20.0).unwrap(),
    ];
    let position = assemble(StrategyKind::Full, legs);

    for terminal in [570.0, 588.5, 600.0, 601.37, 612.0, 630.0] {
        let report =
            eod_settlement(&config, &position, terminal, terminal * 10.0).unwrap();
        assert!(
            (report.net_pnl - position.total_credit).abs() < 1.0,
            "terminal {terminal}: pnl {} vs credit {}",
            report.net_pnl,
            position.total_credit
        );
    }
}

#[test]
fn test_credit_equals_sum_of_leg_cash_flows() {
    let legs = vec![
        Leg::new("SPX", 6000.0, Right::Call, LegAction::Sell, 1, 25.0).unwrap(),
        Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 10, 2.40).unwrap(),
        Leg::new("SPY", 600.0, Right::Put, LegAction::Sell, 10, 2.10).unwrap(),
        Leg::new("SPX", 6000.0, Right::Put, LegAction::Buy, 1, 20.0).unwrap(),
    ];
    let position = assemble(StrategyKind::Full, legs);
    let flows: f64 = position.legs.iter().map(Leg::cash_flow).sum();
    assert!((position.total_credit - flows).abs() < 1e-9);
}

#[test]
fn test_intrinsic_parity_under_leg_pnl() {
    // Spot checks tying per-leg P&L to intrinsics.
    let buy = Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 1, 1.0).unwrap();
    for u in [590.0, 600.0, 610.0] {
        let call = settlement_value(u, 600.0, Right::Call);
        let put = settlement_value(u, 600.0, Right::Put);
        assert!((call - put - (u - 600.0)).abs() < 1e-9);
        assert_eq!(per_leg_pnl(&buy, call), (call - 1.0) * 100.0);
    }
}

#[test]
fn test_grid_rejects_bad_entries() {
    let config = spy_spx_config(StrategyKind::CallsOnly);
    let position = call_hedge(25.00, 2.40);
    assert!(best_worst_case(&config, &position, 0.0, 6000.0).is_err());

    let empty = assemble(StrategyKind::CallsOnly, Vec::new());
    assert!(best_worst_case(&config, &empty, 600.0, 6000.0).is_err());
}
