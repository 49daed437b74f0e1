//! The broker adapter contract and its wire-level records.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use indexarb_models::{Error, Result, Right};

/// Adapter connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Account-level balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_id: String,
    pub net_liquidation: f64,
    pub total_cash: f64,
    pub available_funds: f64,
    pub buying_power: f64,
}

/// An option contract as the broker identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub strike: f64,
    pub right: Right,
    /// `yyyymmdd`.
    pub expiry: String,
}

/// One open position at the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub contract: OptionContract,
    /// Signed contract count; negative is short.
    pub size: i64,
    /// Average cost per contract (premium x multiplier).
    pub avg_cost: f64,
    pub market_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
}

/// Order flavor for closing a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit { limit_price: f64 },
}

/// Terminal-enough order states the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    Filled,
    Cancelled,
}

/// Acknowledgement for a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub avg_fill_price: f64,
}

/// A two-sided quote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub bid: f64,
    pub ask: f64,
}

impl QuoteSnapshot {
    pub fn midpoint(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

/// The abstract broker surface.
///
/// Implementations take `&self`; connection state lives behind interior
/// mutability so one adapter can be shared across tasks.
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    /// Establish the session. Idempotent when already connected.
    async fn connect(&self) -> Result<()>;

    /// Tear the session down.
    async fn disconnect(&self) -> Result<()>;

    fn connection_state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    async fn account_summary(&self) -> Result<AccountSummary>;

    async fn positions(&self) -> Result<Vec<BrokerPosition>>;

    /// Last price for an underlying, or `None` when the broker has no
    /// market for it.
    async fn current_price(&self, symbol: &str) -> Result<Option<f64>>;

    async fn option_quote(&self, contract: &OptionContract) -> Result<QuoteSnapshot>;

    /// Close `quantity` contracts of a position with an opposing order.
    async fn close_position(
        &self,
        contract: &OptionContract,
        quantity: u32,
        order: OrderType,
    ) -> Result<OrderAck>;
}

/// Run a broker call under a deadline, mapping a timeout to
/// `deadline_exceeded`.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::DeadlineExceeded(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_midpoint() {
        let q = QuoteSnapshot { bid: 2.3, ask: 2.5 };
        assert!((q.midpoint() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_order_type_serializes_tagged() {
        let json = serde_json::to_string(&OrderType::Limit { limit_price: 1.25 }).unwrap();
        assert!(json.contains("\"type\":\"limit\""));
        assert!(json.contains("1.25"));
    }
}
