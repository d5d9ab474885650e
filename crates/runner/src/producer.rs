//! Producer - grows one commodity and delivers it to its specialist

use granary_broker::Market;
use granary_core::{Basket, Commodity};
use granary_ports::StopToken;
use std::sync::Arc;

use crate::tally::Tally;
use crate::workload::Workload;

/// Delivers a configured number of batches of one commodity
pub struct Producer {
    id: usize,
    commodity: Commodity,
    iterations: u64,
    market: Arc<Market>,
    workload: Box<dyn Workload>,
    delivered: Tally,
}

impl Producer {
    pub fn new(
        id: usize,
        commodity: Commodity,
        iterations: u64,
        market: Arc<Market>,
        workload: Box<dyn Workload>,
    ) -> Self {
        Self {
            id,
            commodity,
            iterations,
            market,
            workload,
            delivered: Tally::new(),
        }
    }

    pub fn commodity(&self) -> Commodity {
        self.commodity
    }

    /// Handle on the running total delivered so far
    pub fn delivered(&self) -> Tally {
        self.delivered.clone()
    }

    /// Run until the iteration budget is spent or `stop` fires.
    ///
    /// Returns the total delivered.
    pub async fn run(mut self, stop: StopToken) -> Basket {
        log::info!(
            "[producer-{}] started: {} deliveries of {}",
            self.id,
            self.iterations,
            self.commodity
        );

        for _ in 0..self.iterations {
            let pause = self.workload.pause();
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    log::info!("[producer-{}] interrupted while sleeping", self.id);
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }

            let amount = self.workload.delivery_size();
            log::debug!(
                "[producer-{}] delivering {} {} of {} to the {} broker",
                self.id,
                amount,
                if amount == 1 { "bushel" } else { "bushels" },
                self.commodity,
                self.commodity
            );
            self.market.broker(self.commodity).deliver(amount).await;
            self.delivered.credit(self.commodity, amount);
        }

        log::info!("[producer-{}] shutting down", self.id);
        self.delivered.snapshot()
    }
}
