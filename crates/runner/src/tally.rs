use granary_core::{Amount, Basket, Commodity};
use parking_lot::Mutex;
use std::sync::Arc;

/// Running total written by one actor and readable from anywhere
#[derive(Debug, Clone, Default)]
pub struct Tally {
    inner: Arc<Mutex<Basket>>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, commodity: Commodity, amount: Amount) {
        self.inner.lock().credit(commodity, amount);
    }

    pub fn add(&self, basket: &Basket) {
        *self.inner.lock() += *basket;
    }

    /// Copy of the current total
    pub fn snapshot(&self) -> Basket {
        *self.inner.lock()
    }
}
