use granary_core::Amount;
use granary_ports::{SourcingStrategy, Terms};

/// Draw the whole shortfall from the peer's stock without collateral
///
/// Per-broker totals are not preserved, which lets a bundle larger than the
/// primary broker's own stock be assembled from the specialists.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorrowSourcing;

impl BorrowSourcing {
    pub fn new() -> Self {
        Self
    }
}

impl SourcingStrategy for BorrowSourcing {
    fn name(&self) -> &str {
        "borrow"
    }

    fn terms(&self, shortfall: Amount, _spare: Amount) -> Terms {
        Terms {
            receive: shortfall,
            give: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_ignore_spare() {
        let s = BorrowSourcing::new();
        assert_eq!(s.terms(7, 0), Terms { receive: 7, give: 0 });
        assert_eq!(s.terms(7, 100), Terms { receive: 7, give: 0 });
        assert!(s.terms(0, 3).is_empty());
    }
}
