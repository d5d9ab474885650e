//! Granary Ports
//!
//! Port definitions (traits) for the Granary brokerage.
//! These define the boundary between a broker and the peers and strategies
//! it negotiates with.

mod desk;
mod error;
mod sourcing;
mod stop;

pub use desk::Desk;
pub use error::{BrokerError, BrokerResult};
pub use sourcing::{SourcingStrategy, Terms};
pub use stop::{StopSignal, StopToken};
