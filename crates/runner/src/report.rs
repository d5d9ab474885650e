//! Final accounting of a run
//!
//! Everything that entered the market was either consumed or is still held by
//! some broker: `produced = held + consumed` for every commodity.

use chrono::{DateTime, Utc};
use granary_core::{Amount, Basket, Commodity};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RunnerError};

/// Inventory left at one broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerHolding {
    pub commodity: Commodity,
    pub holding: Basket,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Sourcing strategy the brokers used
    pub sourcing: String,
    /// Sum over all producers
    pub produced: Basket,
    /// Per-broker inventory after every actor stopped
    pub brokers: Vec<BrokerHolding>,
    /// Per-consumer totals, indexed by consumer id
    pub consumers: Vec<Basket>,
}

impl SimulationReport {
    /// Sum of all broker inventories
    pub fn held(&self) -> Basket {
        self.brokers.iter().map(|b| b.holding).sum()
    }

    /// Sum over all consumers
    pub fn consumed(&self) -> Basket {
        self.consumers.iter().copied().sum()
    }

    /// `produced - held - consumed` per commodity; all zero on a sound run
    pub fn balance(&self) -> [(Commodity, i128); Commodity::COUNT] {
        let held = self.held();
        let consumed = self.consumed();
        Commodity::ALL.map(|c| (c, net(self.produced[c], held[c], consumed[c])))
    }

    /// Fail on the first commodity whose books do not balance
    pub fn verify(&self) -> Result<()> {
        let held = self.held();
        let consumed = self.consumed();
        for (commodity, net) in self.balance() {
            if net != 0 {
                return Err(RunnerError::Conservation {
                    commodity,
                    produced: self.produced[commodity],
                    held: held[commodity],
                    consumed: consumed[commodity],
                });
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Signed difference wide enough for any three `Amount`s
fn net(produced: Amount, held: Amount, consumed: Amount) -> i128 {
    i128::from(produced) - i128::from(held) - i128::from(consumed)
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**** Program terminating")?;
        writeln!(f, "Produced {}", self.produced)?;
        for broker in &self.brokers {
            writeln!(f, "{} broker holds {}", broker.commodity, broker.holding)?;
        }
        for (i, consumed) in self.consumers.iter().enumerate() {
            writeln!(f, "Consumer {} consumed {}", i, consumed)?;
        }

        let balance = self
            .balance()
            .iter()
            .map(|(c, n)| format!("{} {}", n, c))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Net excess (deficit) is [{}]", balance)?;

        let produced: Amount = self.produced.total();
        let consumed: Amount = self.consumed().total();
        let held: Amount = self.held().total();
        write!(
            f,
            "Total: produced = {}, consumed = {}, remaining at brokers = {}, net = {}",
            produced,
            consumed,
            held,
            net(produced, held, consumed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(produced: Basket, held: Basket, consumed: Basket) -> SimulationReport {
        let now = Utc::now();
        SimulationReport {
            started_at: now,
            finished_at: now,
            sourcing: "swap".to_string(),
            produced,
            brokers: vec![BrokerHolding {
                commodity: Commodity::Corn,
                holding: held,
            }],
            consumers: vec![consumed],
        }
    }

    #[test]
    fn test_balanced_report_verifies() {
        let r = report(
            Basket::of(Commodity::Corn, 10),
            Basket::of(Commodity::Corn, 4),
            Basket::of(Commodity::Corn, 6),
        );
        assert!(r.verify().is_ok());
        assert!(r.balance().iter().all(|(_, n)| *n == 0));

        let text = r.to_string();
        assert!(text.starts_with("**** Program terminating"));
        assert!(text.contains("Consumer 0 consumed"));
        assert!(text.ends_with(
            "Total: produced = 10, consumed = 6, remaining at brokers = 4, net = 0"
        ));
    }

    #[test]
    fn test_missing_grain_is_reported() {
        let r = report(
            Basket::of(Commodity::Wheat, 10),
            Basket::of(Commodity::Wheat, 3),
            Basket::of(Commodity::Wheat, 5),
        );

        assert_eq!(r.balance()[Commodity::Wheat.index()], (Commodity::Wheat, 2));
        match r.verify() {
            Err(RunnerError::Conservation {
                commodity,
                produced,
                held,
                consumed,
            }) => {
                assert_eq!(commodity, Commodity::Wheat);
                assert_eq!((produced, held, consumed), (10, 3, 5));
            }
            other => panic!("expected conservation error, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_does_not_wrap_on_huge_totals() {
        let r = report(
            Basket::of(Commodity::Rice, u64::MAX),
            Basket::new(),
            Basket::new(),
        );

        assert_eq!(
            r.balance()[Commodity::Rice.index()],
            (Commodity::Rice, i128::from(u64::MAX))
        );
        assert!(r.verify().is_err());
        assert!(r.to_string().ends_with(&format!("net = {}", u64::MAX)));
    }

    #[test]
    fn test_report_serializes() {
        let r = report(Basket::new(), Basket::new(), Basket::new());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["sourcing"], "swap");
        assert_eq!(json["consumers"].as_array().unwrap().len(), 1);
    }
}
