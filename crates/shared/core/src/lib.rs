//! Granary Core Domain
//!
//! Pure domain types for the Granary commodity brokerage.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod basket;
pub mod commodity;

// Re-export commonly used types at crate root
pub use basket::{Amount, Basket};
pub use commodity::{Commodity, ParseCommodityError};
