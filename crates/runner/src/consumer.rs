//! Consumer - repeatedly requests bundles of every commodity

use granary_broker::Market;
use granary_core::Basket;
use granary_ports::{BrokerResult, StopToken};
use std::sync::Arc;

use crate::tally::Tally;
use crate::workload::Workload;

/// Requests bundles until cancelled or its workload runs dry
pub struct Consumer {
    id: usize,
    market: Arc<Market>,
    workload: Box<dyn Workload>,
    consumed: Tally,
}

impl Consumer {
    pub fn new(id: usize, market: Arc<Market>, workload: Box<dyn Workload>) -> Self {
        Self {
            id,
            market,
            workload,
            consumed: Tally::new(),
        }
    }

    /// Handle on the running total consumed so far
    pub fn consumed(&self) -> Tally {
        self.consumed.clone()
    }

    /// Main loop.
    ///
    /// A request is counted only once its broker has filled it; one
    /// interrupted by `stop` contributes nothing. Returns the total
    /// consumed, or the broker error if the protocol broke.
    pub async fn run(mut self, stop: StopToken) -> BrokerResult<Basket> {
        log::info!("[consumer-{}] started", self.id);

        loop {
            let pause = self.workload.pause();
            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    log::info!("[consumer-{}] interrupted while sleeping", self.id);
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }

            let Some(request) = self.workload.next_request() else {
                log::info!("[consumer-{}] workload exhausted", self.id);
                break;
            };

            log::debug!(
                "[consumer-{}] requesting {} from the {} broker",
                self.id,
                request.basket,
                request.primary
            );
            match self
                .market
                .acquire(request.primary, &request.basket, &stop)
                .await
            {
                Ok(()) => {
                    log::debug!(
                        "[consumer-{}] got {} from the {} broker",
                        self.id,
                        request.basket,
                        request.primary
                    );
                    self.consumed.add(&request.basket);
                }
                Err(err) if err.is_cancelled() => {
                    log::info!(
                        "[consumer-{}] interrupted while requesting {} from the {} broker",
                        self.id,
                        request.basket,
                        request.primary
                    );
                    break;
                }
                Err(err) => {
                    log::error!("[consumer-{}] {}", self.id, err);
                    return Err(err);
                }
            }
        }

        Ok(self.consumed.snapshot())
    }
}
