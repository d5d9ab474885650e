//! Granary Runner - Producer/Consumer Simulation
//!
//! Orchestrates a full run of the brokerage:
//!
//! - **Bootstrap**: configuration, market and actor setup
//! - **Workload**: quantities, target brokers and pauses for each actor
//! - **Producer / Consumer**: the actors, one tokio task each
//! - **Simulation**: start, drain, stop and the conservation report
//!
//! ## Architecture
//!
//! ```text
//!  ┌────────────┐  deliver   ┌──────────────────────────────┐  acquire   ┌────────────┐
//!  │ Producer 0 │──────────▶ │            Market            │ ◀──────────│ Consumer 0 │
//!  │ Producer 1 │──────────▶ │  CORN  BARLEY  RICE  WHEAT   │ ◀──────────│ Consumer 1 │
//!  │    ...     │            │     ◀── swap / lend ──▶      │            │    ...     │
//!  └────────────┘            └──────────────────────────────┘            └────────────┘
//!        │                                 │                                  │
//!        └──────── delivered ──────────────┼────────── consumed ──────────────┘
//!                                          ▼
//!                              ┌──────────────────────┐
//!                              │  SimulationReport    │
//!                              │ produced = held +    │
//!                              │            consumed  │
//!                              └──────────────────────┘
//! ```

pub mod bootstrap;
pub mod consumer;
pub mod error;
pub mod producer;
pub mod report;
pub mod simulation;
pub mod tally;
pub mod workload;

// Re-export main types
pub use bootstrap::{SimulationBootstrap, SimulationConfig};
pub use consumer::Consumer;
pub use error::{ConfigError, Result, RunnerError};
pub use producer::Producer;
pub use report::{BrokerHolding, SimulationReport};
pub use simulation::Simulation;
pub use tally::Tally;
pub use workload::{RandomWorkload, Request, ScriptedWorkload, Workload, WorkloadParams};
