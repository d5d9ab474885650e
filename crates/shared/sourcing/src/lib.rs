//! Granary Sourcing Strategies
//!
//! Ways for a broker to price a shortfall of another broker's specialty.

mod borrow;
mod swap;

pub use borrow::BorrowSourcing;
pub use swap::SwapSourcing;

// Re-export the trait from ports for convenience
pub use granary_ports::{SourcingStrategy, Terms};

use std::sync::Arc;

/// Factory function to create sourcing strategies by name
///
/// Returns `None` for names that do not match a known strategy.
pub fn create_sourcing_strategy(name: &str) -> Option<Arc<dyn SourcingStrategy>> {
    match name.trim().to_lowercase().as_str() {
        "swap" => Some(Arc::new(SwapSourcing::new())),
        "borrow" | "lend" => Some(Arc::new(BorrowSourcing::new())),
        _ => None,
    }
}
