use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index};

use crate::commodity::Commodity;

/// Count of bushels
pub type Amount = u64;

/// A quantity of every commodity.
///
/// Used for broker inventories, consumer requests and running totals. Every
/// component is a non-negative count; debits are checked and refuse to go
/// below zero. Baskets compare only componentwise (see [`Basket::covers`]),
/// there is no ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Commodity, Amount>",
    into = "BTreeMap<Commodity, Amount>"
)]
pub struct Basket {
    amounts: [Amount; Commodity::COUNT],
}

impl Basket {
    /// An empty basket
    pub fn new() -> Self {
        Self::default()
    }

    /// A basket holding `amount` of a single commodity
    pub fn of(commodity: Commodity, amount: Amount) -> Self {
        let mut basket = Self::new();
        basket.set(commodity, amount);
        basket
    }

    /// Amount of `commodity` in this basket
    pub fn get(&self, commodity: Commodity) -> Amount {
        self.amounts[commodity.index()]
    }

    /// Overwrite the amount of `commodity`
    pub fn set(&mut self, commodity: Commodity, amount: Amount) {
        self.amounts[commodity.index()] = amount;
    }

    /// Add `amount` of `commodity`
    pub fn credit(&mut self, commodity: Commodity, amount: Amount) {
        self.amounts[commodity.index()] += amount;
    }

    /// Remove `amount` of `commodity`, or leave the basket untouched and
    /// return `None` if it holds less than that.
    pub fn checked_debit(&mut self, commodity: Commodity, amount: Amount) -> Option<()> {
        let slot = &mut self.amounts[commodity.index()];
        *slot = slot.checked_sub(amount)?;
        Some(())
    }

    /// Componentwise difference, `None` if any component would go negative
    pub fn checked_sub(&self, other: &Basket) -> Option<Basket> {
        let mut out = *self;
        for c in Commodity::ALL {
            out.checked_debit(c, other.get(c))?;
        }
        Some(out)
    }

    /// True if this basket holds at least `request` of every commodity
    pub fn covers(&self, request: &Basket) -> bool {
        Commodity::ALL
            .into_iter()
            .all(|c| self.get(c) >= request.get(c))
    }

    /// What is still missing to cover `request` (requested - held, floored at 0)
    pub fn shortfall(&self, request: &Basket) -> Basket {
        Commodity::ALL
            .into_iter()
            .map(|c| (c, request.get(c).saturating_sub(self.get(c))))
            .collect()
    }

    /// Sum over all commodities
    pub fn total(&self) -> Amount {
        self.amounts.iter().sum()
    }

    /// True if every component is zero
    pub fn is_empty(&self) -> bool {
        self.amounts.iter().all(|&n| n == 0)
    }

    /// `(commodity, amount)` pairs in negotiation order
    pub fn iter(&self) -> impl Iterator<Item = (Commodity, Amount)> + '_ {
        Commodity::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl Index<Commodity> for Basket {
    type Output = Amount;

    fn index(&self, commodity: Commodity) -> &Amount {
        &self.amounts[commodity.index()]
    }
}

impl Add for Basket {
    type Output = Basket;

    fn add(mut self, rhs: Basket) -> Basket {
        self += rhs;
        self
    }
}

impl AddAssign for Basket {
    fn add_assign(&mut self, rhs: Basket) {
        for c in Commodity::ALL {
            self.credit(c, rhs.get(c));
        }
    }
}

impl Sum for Basket {
    fn sum<I: Iterator<Item = Basket>>(iter: I) -> Basket {
        iter.fold(Basket::new(), Add::add)
    }
}

impl FromIterator<(Commodity, Amount)> for Basket {
    fn from_iter<I: IntoIterator<Item = (Commodity, Amount)>>(iter: I) -> Self {
        let mut basket = Basket::new();
        for (c, n) in iter {
            basket.credit(c, n);
        }
        basket
    }
}

impl From<BTreeMap<Commodity, Amount>> for Basket {
    fn from(map: BTreeMap<Commodity, Amount>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Basket> for BTreeMap<Commodity, Amount> {
    fn from(basket: Basket) -> Self {
        basket.iter().collect()
    }
}

impl fmt::Display for Basket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "[";
        for (c, n) in self.iter() {
            write!(f, "{}{} {}", sep, n, c)?;
            sep = ", ";
        }
        f.write_str("]")
    }
}
