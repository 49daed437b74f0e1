//! Position construction: direction resolution, credits, margin, and the
//! stale-price gate.
//!
//! This is the single place that turns resolved prices into a tradable
//! [`Position`]. Any required leg whose price is absent or stale refuses
//! the whole construction; nothing downstream needs to re-check.

use indexarb_models::config::{MARGIN_RATE, MONEYNESS_WARN_THRESHOLD};
use indexarb_models::{
    Error, Leg, LegAction, Position, PriceQuote, Result, Right, SpreadDirection, StrategyConfig,
    StrategyKind, CONTRACT_MULTIPLIER,
};

/// Resolved prices for the four possible legs. Legs a strategy does not
/// trade may stay `None`.
#[derive(Debug, Clone, Default)]
pub struct LegPrices {
    pub sym1_call: Option<PriceQuote>,
    pub sym2_call: Option<PriceQuote>,
    pub sym1_put: Option<PriceQuote>,
    pub sym2_put: Option<PriceQuote>,
}

/// Underlying prices at entry, used for the moneyness check.
#[derive(Debug, Clone, Copy)]
pub struct EntryUnderlying {
    pub sym1: f64,
    pub sym2: f64,
}

/// Moneyness of a strike against its underlying, in percent.
pub fn moneyness_pct(strike: f64, underlying: f64) -> f64 {
    (strike - underlying) / underlying * 100.0
}

/// Net credit of one spread: premium collected minus premium paid.
pub fn spread_credit(sell_price: f64, sell_qty: u32, buy_price: f64, buy_qty: u32) -> f64 {
    (sell_price * f64::from(sell_qty) - buy_price * f64::from(buy_qty)) * CONTRACT_MULTIPLIER
}

/// Build a position from resolved leg prices.
///
/// Refuses with `precondition_not_met` (naming the legs) when any
/// required leg is missing a price or the price is stale. A moneyness
/// mismatch beyond the warn threshold attaches a warning but does not
/// refuse.
pub fn build(
    config: &StrategyConfig,
    sym1_strike: f64,
    sym2_strike: f64,
    prices: &LegPrices,
    entry: EntryUnderlying,
) -> Result<Position> {
    if entry.sym1 <= 0.0 || entry.sym2 <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "entry underlying prices must be positive, got {}/{}",
            entry.sym1, entry.sym2
        )));
    }

    let kind = config.strategy_type;
    let mut bad_legs: Vec<String> = Vec::new();
    let mut check = |name: &str, quote: &Option<PriceQuote>, required: bool| {
        if !required {
            return;
        }
        match quote {
            None => bad_legs.push(format!("{name} (no price)")),
            Some(q) if q.is_stale => bad_legs.push(format!("{name} (stale)")),
            Some(_) => {}
        }
    };
    check(
        &format!("{} call", config.sym1),
        &prices.sym1_call,
        kind.trades_calls(),
    );
    check(
        &format!("{} call", config.sym2),
        &prices.sym2_call,
        kind.trades_calls(),
    );
    check(
        &format!("{} put", config.sym1),
        &prices.sym1_put,
        kind.trades_puts(),
    );
    check(
        &format!("{} put", config.sym2),
        &prices.sym2_put,
        kind.trades_puts(),
    );
    if !bad_legs.is_empty() {
        return Err(Error::PreconditionNotMet(format!(
            "cannot build position on stale or missing prices: {}",
            bad_legs.join(", ")
        )));
    }

    let mut legs: Vec<Leg> = Vec::with_capacity(kind.leg_count());
    if kind.trades_calls() {
        let sym1_price = price_of(&prices.sym1_call);
        let sym2_price = price_of(&prices.sym2_call);
        legs.extend(spread_legs(
            config,
            config.call_direction,
            Right::Call,
            sym1_strike,
            sym2_strike,
            sym1_price,
            sym2_price,
        )?);
    }
    if kind.trades_puts() {
        let sym1_price = price_of(&prices.sym1_put);
        let sym2_price = price_of(&prices.sym2_put);
        legs.extend(spread_legs(
            config,
            config.put_direction,
            Right::Put,
            sym1_strike,
            sym2_strike,
            sym1_price,
            sym2_price,
        )?);
    }

    let mut position = assemble(kind, legs);

    let m1 = moneyness_pct(sym1_strike, entry.sym1);
    let m2 = moneyness_pct(sym2_strike, entry.sym2);
    let diff = (m1 - m2).abs();
    if diff > MONEYNESS_WARN_THRESHOLD {
        position.warnings.push(format!(
            "moneyness mismatch {diff:.3}% between {} {sym1_strike} ({m1:+.3}%) and {} {sym2_strike} ({m2:+.3}%)",
            config.sym1, config.sym2
        ));
    }

    Ok(position)
}

/// Assemble a position from already-built legs, computing credits and the
/// margin estimate.
///
/// Margin per spread is `max(0, 20% of short notional - credit)`; long
/// legs need no additional margin.
pub fn assemble(kind: StrategyKind, legs: Vec<Leg>) -> Position {
    let call_credit: f64 = legs
        .iter()
        .filter(|l| l.right == Right::Call)
        .map(Leg::cash_flow)
        .sum();
    let put_credit: f64 = legs
        .iter()
        .filter(|l| l.right == Right::Put)
        .map(Leg::cash_flow)
        .sum();

    let short_notional = |right: Right| -> f64 {
        legs.iter()
            .filter(|l| l.right == right && l.action == LegAction::Sell)
            .map(|l| f64::from(l.quantity) * l.strike * CONTRACT_MULTIPLIER * MARGIN_RATE)
            .sum()
    };
    let call_margin = (short_notional(Right::Call) - call_credit).max(0.0);
    let put_margin = (short_notional(Right::Put) - put_credit).max(0.0);

    Position {
        strategy_type: kind,
        legs,
        call_credit,
        put_credit,
        total_credit: call_credit + put_credit,
        estimated_margin: call_margin + put_margin,
        warnings: Vec::new(),
    }
}

fn price_of(quote: &Option<PriceQuote>) -> f64 {
    quote.as_ref().map(|q| q.price).unwrap_or_default()
}

/// The two legs of one spread, sell side first.
fn spread_legs(
    config: &StrategyConfig,
    direction: SpreadDirection,
    right: Right,
    sym1_strike: f64,
    sym2_strike: f64,
    sym1_price: f64,
    sym2_price: f64,
) -> Result<[Leg; 2]> {
    let (sell, buy) = match direction {
        SpreadDirection::SellSym2BuySym1 => (
            (&config.sym2, sym2_strike, sym2_price, 1),
            (&config.sym1, sym1_strike, sym1_price, config.qty_ratio),
        ),
        SpreadDirection::SellSym1BuySym2 => (
            (&config.sym1, sym1_strike, sym1_price, config.qty_ratio),
            (&config.sym2, sym2_strike, sym2_price, 1),
        ),
    };
    Ok([
        Leg::new(sell.0, sell.1, right, LegAction::Sell, sell.3, sell.2)?,
        Leg::new(buy.0, buy.1, right, LegAction::Buy, buy.3, buy.2)?,
    ])
}
