//! Workload - what each actor asks for, and when
//!
//! Quantities, target brokers and pauses are external stimulus for the
//! brokers. Each actor owns its own workload so a run is reproducible from a
//! single seed regardless of how the tasks interleave.

use granary_core::{Amount, Basket, Commodity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// A consumer's bundle and the broker it is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub primary: Commodity,
    pub basket: Basket,
}

impl Request {
    pub fn new(primary: Commodity, basket: Basket) -> Self {
        Self { primary, basket }
    }
}

/// Source of actor stimulus
pub trait Workload: Send {
    /// Bushels to deliver on the next production round
    fn delivery_size(&mut self) -> Amount;

    /// Next bundle to request, `None` once the consumer should stop
    fn next_request(&mut self) -> Option<Request>;

    /// Delay before the next round
    fn pause(&mut self) -> Duration;
}

/// Bounds for randomly generated workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadParams {
    /// Largest single delivery (at least 1)
    pub max_delivery: Amount,
    /// Largest per-commodity amount in a request (at least 1)
    pub max_request: Amount,
    /// Pauses are drawn from `0..max_pause_ms`
    pub max_pause_ms: u64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            max_delivery: 10,
            max_request: 10,
            max_pause_ms: 100,
        }
    }
}

/// Uniformly random workload
pub struct RandomWorkload {
    params: WorkloadParams,
    rng: StdRng,
}

impl RandomWorkload {
    /// Create a workload seeded from the OS
    pub fn new(params: WorkloadParams) -> Self {
        Self {
            params,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with a specific seed for reproducible runs
    pub fn with_seed(params: WorkloadParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Workload for RandomWorkload {
    fn delivery_size(&mut self) -> Amount {
        self.rng.gen_range(1..=self.params.max_delivery.max(1))
    }

    fn next_request(&mut self) -> Option<Request> {
        let max = self.params.max_request.max(1);
        let basket = Commodity::ALL
            .into_iter()
            .map(|c| (c, self.rng.gen_range(1..=max)))
            .collect();
        let primary = Commodity::ALL[self.rng.gen_range(0..Commodity::COUNT)];
        Some(Request::new(primary, basket))
    }

    fn pause(&mut self) -> Duration {
        if self.params.max_pause_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..self.params.max_pause_ms))
    }
}

/// Fixed script of deliveries and requests, without pauses
///
/// Deliveries past the end of the script are empty; requests past the end
/// stop the consumer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWorkload {
    deliveries: VecDeque<Amount>,
    requests: VecDeque<Request>,
}

impl ScriptedWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(mut self, amounts: impl IntoIterator<Item = Amount>) -> Self {
        self.deliveries.extend(amounts);
        self
    }

    pub fn requests(mut self, requests: impl IntoIterator<Item = Request>) -> Self {
        self.requests.extend(requests);
        self
    }
}

impl Workload for ScriptedWorkload {
    fn delivery_size(&mut self) -> Amount {
        self.deliveries.pop_front().unwrap_or(0)
    }

    fn next_request(&mut self) -> Option<Request> {
        self.requests.pop_front()
    }

    fn pause(&mut self) -> Duration {
        Duration::ZERO
    }
}
