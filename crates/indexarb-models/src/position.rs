//! Strategy configuration and position value types.
//!
//! A position is 0-4 option legs across the two symbols of a pair plus
//! the credits and margin computed at construction. Construction logic
//! (direction resolution, the stale-price gate) lives in the engine crate;
//! these are the records it produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Error, Result};
use crate::market::Right;

/// Cash multiplier per option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Which legs a strategy trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One call spread plus one put spread (four legs).
    Full,
    CallsOnly,
    PutsOnly,
}

impl StrategyKind {
    pub fn trades_calls(&self) -> bool {
        matches!(self, StrategyKind::Full | StrategyKind::CallsOnly)
    }

    pub fn trades_puts(&self) -> bool {
        matches!(self, StrategyKind::Full | StrategyKind::PutsOnly)
    }

    /// Leg count a well-formed position of this kind carries.
    pub fn leg_count(&self) -> usize {
        match self {
            StrategyKind::Full => 4,
            StrategyKind::CallsOnly | StrategyKind::PutsOnly => 2,
        }
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(StrategyKind::Full),
            "calls_only" => Ok(StrategyKind::CallsOnly),
            "puts_only" => Ok(StrategyKind::PutsOnly),
            other => Err(Error::InvalidArgument(format!(
                "unknown strategy type: {other:?}"
            ))),
        }
    }
}

/// Which side of the pair is sold in a spread.
///
/// The sym2 leg always carries 1 contract per `qty_ratio` contracts of
/// sym1, regardless of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadDirection {
    SellSym2BuySym1,
    SellSym1BuySym2,
}

impl FromStr for SpreadDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sell_sym2_buy_sym1" => Ok(SpreadDirection::SellSym2BuySym1),
            "sell_sym1_buy_sym2" => Ok(SpreadDirection::SellSym1BuySym2),
            other => Err(Error::InvalidArgument(format!(
                "unknown spread direction: {other:?}"
            ))),
        }
    }
}

/// Configuration for a single arbitrage analysis. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// e.g. "SPY", "XSP".
    pub sym1: String,
    /// e.g. "SPX".
    pub sym2: String,
    /// 10 for SPX pairs, 1 otherwise.
    pub qty_ratio: u32,
    /// Strike increment of sym2 (5 for SPX, 1 otherwise).
    pub strike_step_sym2: u32,
    pub strategy_type: StrategyKind,
    pub call_direction: SpreadDirection,
    pub put_direction: SpreadDirection,
}

impl StrategyConfig {
    /// Build a validated config with explicit ratio and strike step.
    pub fn new(
        sym1: impl Into<String>,
        sym2: impl Into<String>,
        qty_ratio: u32,
        strike_step_sym2: u32,
        strategy_type: StrategyKind,
        call_direction: SpreadDirection,
        put_direction: SpreadDirection,
    ) -> Result<Self> {
        let sym1 = sym1.into();
        let sym2 = sym2.into();
        if sym1.is_empty() || sym2.is_empty() {
            return Err(Error::InvalidArgument("empty symbol in pair".into()));
        }
        if sym1 == sym2 {
            return Err(Error::InvalidArgument(format!(
                "pair symbols must differ, got {sym1}/{sym2}"
            )));
        }
        if qty_ratio == 0 {
            return Err(Error::InvalidArgument("qty_ratio must be positive".into()));
        }
        if strike_step_sym2 == 0 {
            return Err(Error::InvalidArgument(
                "strike_step_sym2 must be positive".into(),
            ));
        }
        Ok(Self {
            sym1,
            sym2,
            qty_ratio,
            strike_step_sym2,
            strategy_type,
            call_direction,
            put_direction,
        })
    }

    /// Build a config for a registered pair, deriving ratio and strike
    /// step from sym2.
    pub fn for_pair(
        sym1: impl Into<String>,
        sym2: impl Into<String>,
        strategy_type: StrategyKind,
        call_direction: SpreadDirection,
        put_direction: SpreadDirection,
    ) -> Result<Self> {
        let sym2 = sym2.into();
        let qty_ratio = config::qty_ratio_for(&sym2);
        let strike_step = config::strike_step_for(&sym2);
        Self::new(
            sym1,
            sym2,
            qty_ratio,
            strike_step,
            strategy_type,
            call_direction,
            put_direction,
        )
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegAction {
    Buy,
    Sell,
}

impl fmt::Display for LegAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegAction::Buy => f.write_str("BUY"),
            LegAction::Sell => f.write_str("SELL"),
        }
    }
}

/// A single leg of an options position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    pub action: LegAction,
    pub quantity: u32,
    pub entry_price: f64,
}

impl Leg {
    pub fn new(
        symbol: impl Into<String>,
        strike: f64,
        right: Right,
        action: LegAction,
        quantity: u32,
        entry_price: f64,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(Error::InvalidArgument("leg quantity must be positive".into()));
        }
        if !entry_price.is_finite() || entry_price < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "leg entry price must be a non-negative number, got {entry_price}"
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            strike,
            right,
            action,
            quantity,
            entry_price,
        })
    }

    /// Cash flow at entry: positive for premium collected, negative for
    /// premium paid.
    pub fn cash_flow(&self) -> f64 {
        let sign = match self.action {
            LegAction::Sell => 1.0,
            LegAction::Buy => -1.0,
        };
        sign * self.entry_price * f64::from(self.quantity) * CONTRACT_MULTIPLIER
    }
}

/// A complete multi-leg position with computed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub strategy_type: StrategyKind,
    pub legs: Vec<Leg>,
    pub call_credit: f64,
    pub put_credit: f64,
    pub total_credit: f64,
    pub estimated_margin: f64,
    /// Non-fatal construction caveats (e.g. moneyness mismatch).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Position {
    /// Legs of the given right.
    pub fn legs_for(&self, right: Right) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(move |l| l.right == right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_bad_input() {
        assert!(StrategyConfig::new(
            "SPY",
            "SPY",
            10,
            5,
            StrategyKind::Full,
            SpreadDirection::SellSym2BuySym1,
            SpreadDirection::SellSym1BuySym2,
        )
        .is_err());
        assert!(StrategyConfig::new(
            "SPY",
            "SPX",
            0,
            5,
            StrategyKind::Full,
            SpreadDirection::SellSym2BuySym1,
            SpreadDirection::SellSym1BuySym2,
        )
        .is_err());
    }

    #[test]
    fn test_for_pair_derives_ratio_and_step() {
        let cfg = StrategyConfig::for_pair(
            "SPY",
            "SPX",
            StrategyKind::CallsOnly,
            SpreadDirection::SellSym2BuySym1,
            SpreadDirection::SellSym1BuySym2,
        )
        .unwrap();
        assert_eq!(cfg.qty_ratio, 10);
        assert_eq!(cfg.strike_step_sym2, 5);

        let cfg = StrategyConfig::for_pair(
            "SPY",
            "XSP",
            StrategyKind::CallsOnly,
            SpreadDirection::SellSym2BuySym1,
            SpreadDirection::SellSym1BuySym2,
        )
        .unwrap();
        assert_eq!(cfg.qty_ratio, 1);
        assert_eq!(cfg.strike_step_sym2, 1);
    }

    #[test]
    fn test_leg_cash_flow_sign() {
        let sell = Leg::new("SPX", 6000.0, Right::Call, LegAction::Sell, 1, 24.0).unwrap();
        let buy = Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 10, 2.4).unwrap();
        assert_eq!(sell.cash_flow(), 2400.0);
        assert_eq!(buy.cash_flow(), -2400.0);
    }

    #[test]
    fn test_leg_rejects_zero_quantity() {
        assert!(Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 0, 1.0).is_err());
        assert!(Leg::new("SPY", 600.0, Right::Call, LegAction::Buy, 1, -1.0).is_err());
    }

    #[test]
    fn test_action_serializes_upper() {
        assert_eq!(serde_json::to_string(&LegAction::Sell).unwrap(), "\"SELL\"");
    }
}
