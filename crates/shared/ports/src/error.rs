use granary_core::Commodity;
use thiserror::Error;

/// Errors raised by broker operations
///
/// A request that cannot be filled yet is not an error: the caller blocks.
/// `Cancelled` is ordinary shutdown, everything else is a protocol bug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("Operation cancelled by stop signal")]
    Cancelled,

    #[error("Invalid swap: {offered} offered to the {specialty} broker for its own specialty")]
    InvalidSwap {
        offered: Commodity,
        specialty: Commodity,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl BrokerError {
    /// True for the expected shutdown outcome
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BrokerError::Cancelled)
    }
}

pub type BrokerResult<T> = std::result::Result<T, BrokerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_distinct_from_violations() {
        assert!(BrokerError::Cancelled.is_cancelled());
        assert!(!BrokerError::InvariantViolation("negative stock".into()).is_cancelled());
    }

    #[test]
    fn test_invalid_swap_message() {
        let err = BrokerError::InvalidSwap {
            offered: Commodity::Rice,
            specialty: Commodity::Rice,
        };
        assert_eq!(
            err.to_string(),
            "Invalid swap: RICE offered to the RICE broker for its own specialty"
        );
    }
}
