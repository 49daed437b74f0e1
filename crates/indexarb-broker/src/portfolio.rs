//! Live portfolio view over the adapter.
//!
//! Pulls account state and open option positions, marks each position
//! with a fresh quote, and totals unrealized P&L. Every broker call runs
//! under the supplied per-call deadline.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use indexarb_models::Result;

use crate::adapter::{
    with_deadline, AccountSummary, BrokerAdapter, BrokerPosition, OptionContract,
};

/// One position marked to market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioPosition {
    pub contract: OptionContract,
    pub size: i64,
    pub avg_cost: f64,
    pub market_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
}

/// Account plus marked positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioView {
    pub account: AccountSummary,
    pub positions: Vec<PortfolioPosition>,
    /// Sum over positions with a known mark.
    pub total_unrealized: f64,
}

/// Assemble the live view. Positions whose quote lookup fails keep the
/// broker-reported mark (or none); the view never fails on a single
/// missing quote.
pub async fn portfolio_view<B>(broker: &B, per_call_deadline: Duration) -> Result<PortfolioView>
where
    B: BrokerAdapter + ?Sized,
{
    let account = with_deadline(per_call_deadline, broker.account_summary()).await?;
    let positions = with_deadline(per_call_deadline, broker.positions()).await?;

    let mut marked = Vec::with_capacity(positions.len());
    let mut total_unrealized = 0.0;
    for position in positions {
        let marked_position = mark_position(broker, per_call_deadline, position).await;
        if let Some(pnl) = marked_position.unrealized_pnl {
            total_unrealized += pnl;
        }
        marked.push(marked_position);
    }

    Ok(PortfolioView {
        account,
        positions: marked,
        total_unrealized,
    })
}

async fn mark_position<B>(
    broker: &B,
    deadline: Duration,
    position: BrokerPosition,
) -> PortfolioPosition
where
    B: BrokerAdapter + ?Sized,
{
    let contract = position.contract.clone();
    let mark = match with_deadline(deadline, broker.option_quote(&contract)).await {
        Ok(quote) => Some(quote.midpoint()),
        Err(e) => {
            debug!(
                symbol = %contract.symbol,
                strike = contract.strike,
                "quote lookup failed, falling back to broker mark: {e}"
            );
            position.market_price
        }
    };

    let size = position.size as f64;
    let (market_value, unrealized) = match mark {
        Some(price) => {
            let value = price * 100.0 * size;
            (Some(value), Some(value - position.avg_cost * size))
        }
        None => (position.market_value, position.unrealized_pnl),
    };

    PortfolioPosition {
        contract,
        size: position.size,
        avg_cost: position.avg_cost,
        market_price: mark,
        market_value,
        unrealized_pnl: unrealized,
    }
}
