//! Bootstrap - configuration and simulation setup
//!
//! Handles everything that happens before the first task starts:
//! - Validating the configuration
//! - Opening the market with the configured sourcing strategy
//! - Building producers and consumers, each with its own workload

use granary_broker::Market;
use granary_core::{Amount, Commodity};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::consumer::Consumer;
use crate::error::{ConfigError, Result};
use crate::producer::Producer;
use crate::workload::{RandomWorkload, Workload, WorkloadParams};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of producers, assigned commodities round-robin
    pub producers: usize,
    /// Number of consumers
    pub consumers: usize,
    /// Deliveries each producer makes before stopping
    pub iterations: u64,
    /// Master seed; `None` seeds every actor from the OS
    pub seed: Option<u64>,
    /// Sourcing strategy name ("swap" or "borrow")
    pub sourcing: String,
    /// Largest single delivery
    pub max_delivery: Amount,
    /// Largest per-commodity amount in a request
    pub max_request: Amount,
    /// Producer pause upper bound (ms)
    pub producer_pause_ms: u64,
    /// Consumer pause upper bound (ms)
    pub consumer_pause_ms: u64,
    /// Time consumers get to finish after the last delivery (ms)
    pub drain_grace_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            producers: Commodity::COUNT,
            consumers: 4,
            iterations: 100,
            seed: None,
            sourcing: "swap".to_string(),
            max_delivery: 10,
            max_request: 10,
            producer_pause_ms: 100,
            consumer_pause_ms: 500,
            drain_grace_ms: 3000,
        }
    }
}

impl SimulationConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let positive = [
            ("producers", self.producers as u64),
            ("consumers", self.consumers as u64),
            ("iterations", self.iterations),
            ("max_delivery", self.max_delivery),
            ("max_request", self.max_request),
        ];
        if let Some((field, _)) = positive.into_iter().find(|(_, n)| *n == 0) {
            return Err(ConfigError::NonPositive { field });
        }
        if granary_sourcing::create_sourcing_strategy(&self.sourcing).is_none() {
            return Err(ConfigError::UnknownSourcing(self.sourcing.clone()));
        }
        Ok(())
    }
}

/// Simulation bootstrap - opens the market and builds the actors
pub struct SimulationBootstrap {
    /// The market every actor trades through
    pub market: Arc<Market>,
    /// Producers, not yet started
    pub producers: Vec<Producer>,
    /// Consumers, not yet started
    pub consumers: Vec<Consumer>,
}

impl SimulationBootstrap {
    /// Create bootstrap with custom configuration
    pub fn with_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let sourcing = granary_sourcing::create_sourcing_strategy(&config.sourcing)
            .ok_or_else(|| ConfigError::UnknownSourcing(config.sourcing.clone()))?;
        let market = Arc::new(Market::new(sourcing));

        // One generator hands out per-actor seeds in construction order
        let mut seeder = config.seed.map(StdRng::seed_from_u64);
        let mut workload = |max_pause_ms: u64| -> Box<dyn Workload> {
            let params = WorkloadParams {
                max_delivery: config.max_delivery,
                max_request: config.max_request,
                max_pause_ms,
            };
            match seeder.as_mut() {
                Some(seeder) => Box::new(RandomWorkload::with_seed(params, seeder.next_u64())),
                None => Box::new(RandomWorkload::new(params)),
            }
        };

        let producers = (0..config.producers)
            .map(|id| {
                let commodity = Commodity::ALL[id % Commodity::COUNT];
                Producer::new(
                    id,
                    commodity,
                    config.iterations,
                    market.clone(),
                    workload(config.producer_pause_ms),
                )
            })
            .collect();

        let consumers = (0..config.consumers)
            .map(|id| Consumer::new(id, market.clone(), workload(config.consumer_pause_ms)))
            .collect();

        log::info!(
            "Bootstrapped {} producers and {} consumers ({} iterations, seed {:?})",
            config.producers,
            config.consumers,
            config.iterations,
            config.seed
        );

        Ok(Self {
            market,
            producers,
            consumers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_counts_rejected() {
        let config = SimulationConfig {
            consumers: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "consumers" })
        ));

        let config = SimulationConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "iterations" })
        ));
    }

    #[test]
    fn test_unknown_sourcing_rejected() {
        let config = SimulationConfig {
            sourcing: "barter".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownSourcing(name)) if name == "barter"
        ));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SimulationConfig::from_json(r#"{"consumers": 2, "seed": 0, "sourcing": "borrow"}"#)
                .unwrap();
        assert_eq!(config.consumers, 2);
        assert_eq!(config.seed, Some(0));
        assert_eq!(config.sourcing, "borrow");
        assert_eq!(config.iterations, 100);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            SimulationConfig::from_json(r#"{"producers": 0}"#),
            Err(ConfigError::NonPositive { field: "producers" })
        ));
        assert!(matches!(
            SimulationConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_producers_assigned_round_robin() {
        let config = SimulationConfig {
            producers: 6,
            seed: Some(1),
            ..Default::default()
        };
        let bootstrap = SimulationBootstrap::with_config(&config).unwrap();

        let assigned: Vec<_> = bootstrap.producers.iter().map(|p| p.commodity()).collect();
        assert_eq!(
            assigned,
            vec![
                Commodity::Corn,
                Commodity::Barley,
                Commodity::Rice,
                Commodity::Wheat,
                Commodity::Corn,
                Commodity::Barley,
            ]
        );
        assert_eq!(bootstrap.consumers.len(), 4);
    }
}
