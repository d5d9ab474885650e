//! Granary Brokers
//!
//! One broker per commodity. Each broker owns an inventory of every
//! commodity, receives deliveries of its specialty and fills consumer
//! bundles, covering shortfalls of other commodities through the peer that
//! specializes in them.
//!
//! ## Protocol
//!
//! ```text
//!   Producer ──deliver──▶ Broker(CORN) ◀──acquire── Consumer
//!                             │
//!                 shortfall of BARLEY, RICE, ...
//!                 (ascending commodity order,
//!                  own lock released first)
//!                             │
//!              ┌──────────────┼──────────────┐
//!              ▼              ▼              ▼
//!        Broker(BARLEY)  Broker(RICE)   Broker(WHEAT)
//!         swap / lend     swap / lend    swap / lend
//! ```
//!
//! Brokers have no threads of their own. Their methods run on the calling
//! actor's task, serialized by a per-broker lock, and every blocking wait can
//! be abandoned through a [`StopToken`].

pub mod broker;
pub mod market;

pub use broker::Broker;
pub use market::Market;

// Re-export the pieces callers need alongside a broker
pub use granary_core::{Amount, Basket, Commodity};
pub use granary_ports::{BrokerError, BrokerResult, Desk, StopSignal, StopToken};
