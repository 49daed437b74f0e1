//! Mock broker with canned data.
//!
//! Satisfies the full adapter contract without a gateway: canned prices,
//! positions, and quotes, the real connection state machine, and an
//! optional per-call latency so deadline handling can be exercised.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use indexarb_models::{Error, Result};

use crate::adapter::{
    AccountSummary, BrokerAdapter, BrokerPosition, ConnectionState, OptionContract, OrderAck,
    OrderStatus, OrderType, QuoteSnapshot,
};

/// Canned-data broker for tests and offline development.
pub struct MockBroker {
    state: RwLock<ConnectionState>,
    prices: HashMap<String, f64>,
    positions: Vec<BrokerPosition>,
    quotes: Vec<(OptionContract, QuoteSnapshot)>,
    account: AccountSummary,
    closed: Mutex<Vec<(OptionContract, u32, OrderType)>>,
    /// Artificial latency applied to every async call.
    response_delay: Option<Duration>,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    pub fn new() -> Self {
        let prices = HashMap::from([
            ("SPY".to_string(), 605.50),
            ("SPX".to_string(), 6055.00),
            ("XSP".to_string(), 605.50),
        ]);
        Self {
            state: RwLock::new(ConnectionState::Disconnected),
            prices,
            positions: Vec::new(),
            quotes: Vec::new(),
            account: AccountSummary {
                account_id: "DU_MOCK".into(),
                net_liquidation: 100_000.00,
                total_cash: 95_000.00,
                available_funds: 80_000.00,
                buying_power: 320_000.00,
            },
            closed: Mutex::new(Vec::new()),
            response_delay: None,
        }
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_position(mut self, position: BrokerPosition) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_quote(mut self, contract: OptionContract, quote: QuoteSnapshot) -> Self {
        self.quotes.push((contract, quote));
        self
    }

    pub fn with_account(mut self, account: AccountSummary) -> Self {
        self.account = account;
        self
    }

    /// Delay every call, for deadline tests.
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    /// Close orders recorded so far.
    pub fn closed_positions(&self) -> Vec<(OptionContract, u32, OrderType)> {
        self.closed.lock().expect("mock lock poisoned").clone()
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.write().expect("mock lock poisoned") = next;
    }

    async fn simulate_latency(&self) {
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn require_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::PreconditionNotMet("broker not connected".into()))
        }
    }
}

#[async_trait]
impl BrokerAdapter for MockBroker {
    async fn connect(&self) -> Result<()> {
        self.simulate_latency().await;
        if self.is_connected() {
            return Ok(());
        }
        self.set_state(ConnectionState::Connecting);
        self.set_state(ConnectionState::Connected);
        debug!("mock broker connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.simulate_latency().await;
        if !self.is_connected() {
            self.set_state(ConnectionState::Disconnected);
            return Ok(());
        }
        self.set_state(ConnectionState::Disconnecting);
        self.set_state(ConnectionState::Disconnected);
        debug!("mock broker disconnected");
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.read().expect("mock lock poisoned")
    }

    async fn account_summary(&self) -> Result<AccountSummary> {
        self.simulate_latency().await;
        self.require_connected()?;
        Ok(self.account.clone())
    }

    async fn positions(&self) -> Result<Vec<BrokerPosition>> {
        self.simulate_latency().await;
        self.require_connected()?;
        Ok(self.positions.clone())
    }

    async fn current_price(&self, symbol: &str) -> Result<Option<f64>> {
        self.simulate_latency().await;
        self.require_connected()?;
        Ok(self.prices.get(symbol).copied())
    }

    async fn option_quote(&self, contract: &OptionContract) -> Result<QuoteSnapshot> {
        self.simulate_latency().await;
        self.require_connected()?;
        self.quotes
            .iter()
            .find(|(c, _)| c == contract)
            .map(|(_, q)| *q)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no quote for {} {} {} {}",
                    contract.symbol, contract.strike, contract.right, contract.expiry
                ))
            })
    }

    async fn close_position(
        &self,
        contract: &OptionContract,
        quantity: u32,
        order: OrderType,
    ) -> Result<OrderAck> {
        self.simulate_latency().await;
        self.require_connected()?;
        if quantity == 0 {
            return Err(Error::InvalidArgument(
                "close quantity must be positive".into(),
            ));
        }
        self.closed
            .lock()
            .expect("mock lock poisoned")
            .push((contract.clone(), quantity, order));

        let fill_price = match order {
            OrderType::Market => self
                .quotes
                .iter()
                .find(|(c, _)| c == contract)
                .map(|(_, q)| q.midpoint())
                .unwrap_or(0.0),
            OrderType::Limit { limit_price } => limit_price,
        };
        Ok(OrderAck {
            order_id: Uuid::new_v4(),
            status: OrderStatus::Filled,
            avg_fill_price: fill_price,
        })
    }
}
