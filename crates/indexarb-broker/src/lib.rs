//! # IndexArb Broker
//!
//! The abstract broker surface the analytical core consumes for live
//! paper or production execution. The core never depends on concrete
//! broker semantics beyond this contract; a real gateway client and the
//! in-crate [`MockBroker`] both satisfy it.
//!
//! ## Connection lifecycle
//! ```text
//! disconnected -> connecting -> connected -> disconnecting -> disconnected
//! ```
//! Read operations on a non-connected adapter fail with
//! `precondition_not_met`. Broker calls are I/O-bound and may block on the
//! network; drive them off the hot analytical path and wrap each call in
//! [`with_deadline`] so a hung gateway surfaces `deadline_exceeded`.

mod adapter;
mod mock;
mod portfolio;

pub use adapter::{
    with_deadline, AccountSummary, BrokerAdapter, BrokerPosition, ConnectionState,
    OptionContract, OrderAck, OrderStatus, OrderType, QuoteSnapshot,
};
pub use mock::MockBroker;
pub use portfolio::{portfolio_view, PortfolioPosition, PortfolioView};
