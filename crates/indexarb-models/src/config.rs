//! Centralized business constants for the arbitrage platform.
//!
//! All hardcoded values that drive strategy logic live here. Import from
//! this module instead of re-declaring values in business logic.
//!
//! [`CONSTANTS`] mirrors every numeric constant by name so a sync test can
//! catch divergence between the code and any table documented elsewhere.

// ===== Quantity & strike ratios =====

/// SPY:SPX trades 10:1 because SPX has $5 strike increments (10x SPY's $1).
pub const QTY_RATIO_SPX: u32 = 10;
/// SPY:XSP and XSP:SPX trade 1:1.
pub const QTY_RATIO_DEFAULT: u32 = 1;

/// SPX options use $5 strike increments.
pub const STRIKE_STEP_SPX: u32 = 5;
/// SPY and XSP options use $1 strike increments.
pub const STRIKE_STEP_DEFAULT: u32 = 1;

// ===== Moneyness & matching =====

/// Strike pairs whose moneyness difference (in percent) exceeds this
/// threshold get a position warning. Display-level only; distinct from the
/// scanner admissibility tolerance below.
pub const MONEYNESS_WARN_THRESHOLD: f64 = 0.05;

/// Scanner admissibility: sym2 strikes must lie within this fraction of
/// `sym1_strike * open_ratio`.
pub const SCANNER_PAIR_TOLERANCE: f64 = 0.005;

// ===== Liquidity =====

/// Bid-ask spread above this percentage of midpoint flags a wide-spread
/// warning.
pub const WIDE_SPREAD_THRESHOLD: f64 = 20.0;

/// Default minimum total daily volume for scanner liquidity filtering.
pub const DEFAULT_MIN_VOLUME: u64 = 10;

// ===== Grid search (best/worst scenario analysis) =====

/// Number of sym1 price points evaluated across the price range.
pub const GRID_PRICE_POINTS: usize = 50;

/// Price range: +/-5% from the entry price.
pub const GRID_PRICE_RANGE_PCT: f64 = 0.05;

/// Basis drift: the sym2/sym1 ratio can shift this fraction intraday.
pub const GRID_BASIS_DRIFT_PCT: f64 = 0.001;

/// The three basis-drift levels evaluated per price point.
pub const GRID_BASIS_DRIFT_LEVELS: [f64; 3] = [-GRID_BASIS_DRIFT_PCT, 0.0, GRID_BASIS_DRIFT_PCT];

// ===== Margin =====

/// Margin estimate: 20% of short notional minus credit received.
pub const MARGIN_RATE: f64 = 0.20;

// ===== Trading day =====

/// 9:30 AM to 4:00 PM ET.
pub const TRADING_DAY_MINUTES: u32 = 390;

// ===== Symbol pair registry =====

/// Canonical (sym1, sym2) pairs the platform analyzes.
pub const SYMBOL_PAIRS: &[(&str, &str)] = &[("XSP", "SPX"), ("SPY", "SPX"), ("SPY", "XSP")];

/// Quantity ratio for a pair, derived from sym2.
pub fn qty_ratio_for(sym2: &str) -> u32 {
    if sym2 == "SPX" {
        QTY_RATIO_SPX
    } else {
        QTY_RATIO_DEFAULT
    }
}

/// Strike step size for sym2.
pub fn strike_step_for(sym2: &str) -> u32 {
    if sym2 == "SPX" {
        STRIKE_STEP_SPX
    } else {
        STRIKE_STEP_DEFAULT
    }
}

/// Name → value table of every numeric constant above.
///
/// Kept in one place so a test can assert the table and the named
/// constants never drift apart.
pub const CONSTANTS: &[(&str, f64)] = &[
    ("QTY_RATIO_SPX", 10.0),
    ("QTY_RATIO_DEFAULT", 1.0),
    ("STRIKE_STEP_SPX", 5.0),
    ("STRIKE_STEP_DEFAULT", 1.0),
    ("MONEYNESS_WARN_THRESHOLD", 0.05),
    ("SCANNER_PAIR_TOLERANCE", 0.005),
    ("WIDE_SPREAD_THRESHOLD", 20.0),
    ("DEFAULT_MIN_VOLUME", 10.0),
    ("GRID_PRICE_POINTS", 50.0),
    ("GRID_PRICE_RANGE_PCT", 0.05),
    ("GRID_BASIS_DRIFT_PCT", 0.001),
    ("MARGIN_RATE", 0.20),
    ("TRADING_DAY_MINUTES", 390.0),
];
