//! Simulation - full run orchestration
//!
//! Starts every producer and consumer, lets production finish, gives
//! consumers a grace period to drain, then stops them and balances the books.

use chrono::Utc;
use granary_broker::{Market, StopSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::bootstrap::{SimulationBootstrap, SimulationConfig};
use crate::consumer::Consumer;
use crate::error::{Result, RunnerError};
use crate::producer::Producer;
use crate::report::{BrokerHolding, SimulationReport};
use crate::tally::Tally;

/// One run of the brokerage
pub struct Simulation {
    config: SimulationConfig,
    market: Arc<Market>,
    producers: Vec<Producer>,
    consumers: Vec<Consumer>,
}

impl Simulation {
    /// Validate `config` and build the market and actors
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let bootstrap = SimulationBootstrap::with_config(&config)?;
        Ok(Self {
            config,
            market: bootstrap.market,
            producers: bootstrap.producers,
            consumers: bootstrap.consumers,
        })
    }

    /// Shared market, for inspection before or after a run
    pub fn market(&self) -> Arc<Market> {
        self.market.clone()
    }

    /// Run to completion and return the verified report
    pub async fn run(self) -> Result<SimulationReport> {
        log::info!(
            "Starting simulation: {} producers, {} consumers, {} sourcing",
            self.producers.len(),
            self.consumers.len(),
            self.market.sourcing().name()
        );
        let started_at = Utc::now();
        let signal = StopSignal::new();

        let produced: Vec<Tally> = self.producers.iter().map(Producer::delivered).collect();
        let consumed: Vec<Tally> = self.consumers.iter().map(Consumer::consumed).collect();

        let consumer_handles: Vec<JoinHandle<_>> = self
            .consumers
            .into_iter()
            .map(|c| tokio::spawn(c.run(signal.token())))
            .collect();
        let producer_handles: Vec<JoinHandle<_>> = self
            .producers
            .into_iter()
            .map(|p| tokio::spawn(p.run(signal.token())))
            .collect();

        let mut failure: Option<RunnerError> = None;

        for handle in producer_handles {
            if let Err(e) = handle.await {
                log::error!("Producer task failed: {}", e);
                failure.get_or_insert(RunnerError::TaskFailed(e.to_string()));
            }
        }

        if failure.is_none() {
            let grace = Duration::from_millis(self.config.drain_grace_ms);
            log::info!("Production finished, draining consumers for {:?}", grace);
            tokio::time::sleep(grace).await;
        }

        log::info!("Stopping consumers");
        signal.stop();

        for handle in consumer_handles {
            match handle.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    failure.get_or_insert(RunnerError::Broker(e));
                }
                Err(e) => {
                    log::error!("Consumer task failed: {}", e);
                    failure.get_or_insert(RunnerError::TaskFailed(e.to_string()));
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let brokers = self
            .market
            .snapshots()
            .await
            .into_iter()
            .map(|(commodity, holding)| BrokerHolding { commodity, holding })
            .collect();

        let report = SimulationReport {
            started_at,
            finished_at: Utc::now(),
            sourcing: self.market.sourcing().name().to_string(),
            produced: produced.iter().map(Tally::snapshot).sum(),
            brokers,
            consumers: consumed.iter().map(Tally::snapshot).collect(),
        };

        log::info!("Simulation finished in {}ms", report.duration().num_milliseconds());
        report.verify()?;
        Ok(report)
    }
}
