//! Market - the context shared by every actor
//!
//! Built once at startup and handed to producers and consumers explicitly.
//! Holds one broker per commodity and the sourcing strategy brokers use to
//! cover shortfalls. The brokers share one supply clock, so a request waiting
//! on one broker wakes when stock arrives at any of its peers.

use granary_core::{Basket, Commodity};
use granary_ports::{BrokerResult, Desk, SourcingStrategy, StopToken};
use granary_sourcing::SwapSourcing;
use std::sync::Arc;

use crate::broker::{self, Broker};

/// One broker per commodity plus the shared sourcing strategy
pub struct Market {
    brokers: [Broker; Commodity::COUNT],
    sourcing: Arc<dyn SourcingStrategy>,
}

impl Market {
    /// Create a market with empty brokers using `sourcing` for shortfalls
    pub fn new(sourcing: Arc<dyn SourcingStrategy>) -> Self {
        log::info!(
            "Opening market with {} brokers ({} sourcing)",
            Commodity::COUNT,
            sourcing.name()
        );
        let supply = broker::supply_clock();
        Self {
            brokers: Commodity::ALL.map(|c| Broker::with_supply(c, supply.clone())),
            sourcing,
        }
    }

    /// The broker specializing in `commodity`
    pub fn broker(&self, commodity: Commodity) -> &Broker {
        &self.brokers[commodity.index()]
    }

    /// Peer-facing surface of the broker specializing in `commodity`
    pub fn desk(&self, commodity: Commodity) -> &dyn Desk {
        self.broker(commodity)
    }

    /// All brokers, in commodity order
    pub fn brokers(&self) -> impl Iterator<Item = &Broker> {
        self.brokers.iter()
    }

    /// Strategy brokers use to cover shortfalls
    pub fn sourcing(&self) -> &dyn SourcingStrategy {
        self.sourcing.as_ref()
    }

    /// Submit `request` to the broker specializing in `primary`
    pub async fn acquire(
        &self,
        primary: Commodity,
        request: &Basket,
        stop: &StopToken,
    ) -> BrokerResult<()> {
        self.broker(primary).acquire(request, self, stop).await
    }

    /// Inventory snapshot of every broker, in commodity order
    pub async fn snapshots(&self) -> Vec<(Commodity, Basket)> {
        let mut out = Vec::with_capacity(Commodity::COUNT);
        for broker in &self.brokers {
            out.push((broker.specialty(), broker.amount_on_hand().await));
        }
        out
    }

    /// Sum of all broker inventories
    pub async fn holdings(&self) -> Basket {
        self.snapshots().await.into_iter().map(|(_, b)| b).sum()
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new(Arc::new(SwapSourcing::new()))
    }
}
