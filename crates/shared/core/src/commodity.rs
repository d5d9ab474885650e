use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A kind of grain traded by the brokers.
///
/// The set is closed and fixed for the life of the process. Declaration order
/// is the global negotiation order: a broker that needs stock from several
/// peers always approaches them in ascending order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Commodity {
    Corn,
    Barley,
    Rice,
    Wheat,
}

impl Commodity {
    /// Number of commodities
    pub const COUNT: usize = 4;

    /// Every commodity, in negotiation order
    pub const ALL: [Commodity; Commodity::COUNT] = [
        Commodity::Corn,
        Commodity::Barley,
        Commodity::Rice,
        Commodity::Wheat,
    ];

    /// Position of this commodity in [`Commodity::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Commodity::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Upper-case display name
    pub fn name(self) -> &'static str {
        match self {
            Commodity::Corn => "CORN",
            Commodity::Barley => "BARLEY",
            Commodity::Rice => "RICE",
            Commodity::Wheat => "WHEAT",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string does not name a commodity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommodityError(pub String);

impl fmt::Display for ParseCommodityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown commodity: {}", self.0)
    }
}

impl std::error::Error for ParseCommodityError {}

impl FromStr for Commodity {
    type Err = ParseCommodityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCommodityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_index_order() {
        for (i, c) in Commodity::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Commodity::from_index(i), Some(*c));
        }
        assert_eq!(Commodity::from_index(Commodity::COUNT), None);
    }

    #[test]
    fn test_negotiation_order() {
        assert!(Commodity::Corn < Commodity::Barley);
        assert!(Commodity::Barley < Commodity::Rice);
        assert!(Commodity::Rice < Commodity::Wheat);
    }

    #[test]
    fn test_parse() {
        assert_eq!("corn".parse::<Commodity>(), Ok(Commodity::Corn));
        assert_eq!(" WHEAT ".parse::<Commodity>(), Ok(Commodity::Wheat));
        assert!("oats".parse::<Commodity>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&Commodity::Barley).unwrap();
        assert_eq!(json, "\"BARLEY\"");
        let back: Commodity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Commodity::Barley);
    }
}
