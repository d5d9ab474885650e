use granary_core::Amount;
use granary_ports::{SourcingStrategy, Terms};

/// One-for-one exchange of the initiator's specialty for the peer's
///
/// The initiator can only offer specialty stock its current request does not
/// need, so a shortfall larger than that spare is covered partially and the
/// rest waits for more deliveries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapSourcing;

impl SwapSourcing {
    pub fn new() -> Self {
        Self
    }
}

impl SourcingStrategy for SwapSourcing {
    fn name(&self) -> &str {
        "swap"
    }

    fn terms(&self, shortfall: Amount, spare: Amount) -> Terms {
        let amount = shortfall.min(spare);
        log::trace!("swap terms: shortfall {}, spare {} -> {}", shortfall, spare, amount);
        Terms {
            receive: amount,
            give: amount,
        }
    }
}
