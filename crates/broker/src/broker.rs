//! Broker - the per-commodity inventory monitor
//!
//! Every operation runs under the broker's own lock and never waits for stock
//! while holding it. Brokers of one market share a supply clock that ticks
//! whenever stock arrives anywhere; waiters read the clock *before*
//! inspecting inventories, so an arrival that lands between the check and
//! the wait is never missed.

use async_trait::async_trait;
use granary_core::{Amount, Basket, Commodity};
use granary_ports::{BrokerError, BrokerResult, Desk, SourcingStrategy, StopToken, Terms};
use log::{debug, trace};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use crate::market::Market;

/// Market-wide counter bumped on every arrival of stock
pub(crate) type SupplyClock = Arc<watch::Sender<u64>>;

pub(crate) fn supply_clock() -> SupplyClock {
    Arc::new(watch::channel(0).0)
}

/// Inventory plus bookkeeping for outstanding negotiations
#[derive(Debug, Default)]
struct Ledger {
    inventory: Basket,
    /// Open sourcing tickets, indexed by peer commodity
    in_flight: [u32; Commodity::COUNT],
}

/// A planned exchange with one peer, settled outside the lock
#[derive(Debug, Clone, Copy)]
struct Ticket {
    commodity: Commodity,
    terms: Terms,
}

/// Outcome of settling one ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    /// Received units credited, payment handed over
    Done,
    /// The peer was short; nothing moved
    PeerShort,
    /// The spare went elsewhere before payment; received units returned
    Unpaid,
}

/// Broker specializing in one commodity
pub struct Broker {
    specialty: Commodity,
    ledger: Mutex<Ledger>,
    supply: SupplyClock,
}

impl Broker {
    /// Create an empty stand-alone broker for `specialty`
    pub fn new(specialty: Commodity) -> Self {
        Self::with_supply(specialty, supply_clock())
    }

    pub(crate) fn with_supply(specialty: Commodity, supply: SupplyClock) -> Self {
        Self {
            specialty,
            ledger: Mutex::new(Ledger::default()),
            supply,
        }
    }

    /// The commodity this broker receives deliveries of
    pub fn specialty(&self) -> Commodity {
        self.specialty
    }

    /// Consistent snapshot of the inventory
    pub async fn amount_on_hand(&self) -> Basket {
        self.ledger.lock().await.inventory
    }

    /// Accept `amount` bushels of the specialty from a producer.
    ///
    /// Never waits for stock; wakes everyone blocked in the market.
    pub async fn deliver(&self, amount: Amount) {
        {
            let mut ledger = self.ledger.lock().await;
            ledger.inventory.credit(self.specialty, amount);
            debug!(
                "[{}] delivered {} -> {}",
                self.specialty, amount, ledger.inventory
            );
        }
        self.tick();
    }

    fn tick(&self) {
        self.supply.send_modify(|t| *t = t.wrapping_add(1));
    }

    /// Fill a consumer request, blocking until every commodity in it is on
    /// hand at once, then debit the whole request in one step.
    ///
    /// `self` must be one of `market`'s brokers. Shortfalls of other
    /// commodities are sourced from their specialists through `market`'s
    /// strategy, one peer at a time in ascending commodity order. No lock is
    /// held and no stock is set aside while a peer is consulted, and a peer
    /// that is short is left alone until supply changes. Returns
    /// `BrokerError::Cancelled` if `stop` fires first, in which case the
    /// request has not been debited.
    pub async fn acquire(
        &self,
        request: &Basket,
        market: &Market,
        stop: &StopToken,
    ) -> BrokerResult<()> {
        if request.is_empty() {
            return Ok(());
        }

        let mut supply = self.supply.subscribe();
        loop {
            supply.borrow_and_update();

            let tickets = {
                let mut ledger = self.ledger.lock().await;
                if ledger.inventory.covers(request) {
                    ledger.inventory = ledger.inventory.checked_sub(request).ok_or_else(|| {
                        BrokerError::InvariantViolation(format!(
                            "{} broker covered {} but could not debit it",
                            self.specialty, request
                        ))
                    })?;
                    debug!(
                        "[{}] filled {} -> {}",
                        self.specialty, request, ledger.inventory
                    );
                    return Ok(());
                }
                self.issue_tickets(&mut ledger, request, market.sourcing())
            };

            if self.settle_tickets(tickets, request, market).await {
                // Something moved, re-check before waiting
                continue;
            }

            trace!("[{}] waiting to fill {}", self.specialty, request);
            tokio::select! {
                _ = supply.changed() => {}
                _ = stop.cancelled() => {
                    debug!("[{}] cancelled while filling {}", self.specialty, request);
                    return Err(BrokerError::Cancelled);
                }
            }
        }
    }

    /// Spare specialty stock: what `request` does not need itself
    fn spare(&self, inventory: &Basket, request: &Basket) -> Amount {
        inventory
            .get(self.specialty)
            .saturating_sub(request.get(self.specialty))
    }

    /// Plan sourcing for every non-specialty shortfall without an open
    /// ticket. Planned payments never exceed the current spare in total.
    fn issue_tickets(
        &self,
        ledger: &mut Ledger,
        request: &Basket,
        sourcing: &dyn SourcingStrategy,
    ) -> Vec<Ticket> {
        let shortfall = ledger.inventory.shortfall(request);
        let mut spare = self.spare(&ledger.inventory, request);
        let mut tickets = Vec::new();

        for (commodity, missing) in shortfall.iter() {
            if commodity == self.specialty
                || missing == 0
                || ledger.in_flight[commodity.index()] > 0
            {
                continue;
            }

            let terms = sourcing.terms(missing, spare);
            if terms.is_empty() || terms.give > spare {
                continue;
            }
            spare -= terms.give;
            ledger.in_flight[commodity.index()] += 1;
            tickets.push(Ticket { commodity, terms });
        }

        tickets
    }

    /// Settle tickets in order. Returns whether any stock moved.
    ///
    /// Every ticket is closed on return.
    async fn settle_tickets(&self, tickets: Vec<Ticket>, request: &Basket, market: &Market) -> bool {
        let mut moved = false;

        for ticket in tickets {
            let peer = market.broker(ticket.commodity);
            let outcome = self.settle(ticket, request, peer).await;
            self.ledger.lock().await.in_flight[ticket.commodity.index()] -= 1;

            debug!(
                "[{}] {:?} sourcing {} {} for {} {}",
                self.specialty,
                outcome,
                ticket.terms.receive,
                ticket.commodity,
                ticket.terms.give,
                self.specialty
            );
            moved |= outcome != Settlement::PeerShort;
        }

        moved
    }

    /// Take the units from `peer` first, then pay from the spare
    async fn settle(&self, ticket: Ticket, request: &Basket, peer: &dyn Desk) -> Settlement {
        let Terms { receive, give } = ticket.terms;
        if !peer.try_lend(receive).await {
            return Settlement::PeerShort;
        }

        let paid = {
            let mut ledger = self.ledger.lock().await;
            let affordable = give <= self.spare(&ledger.inventory, request)
                && ledger
                    .inventory
                    .checked_debit(self.specialty, give)
                    .is_some();
            if affordable {
                ledger.inventory.credit(ticket.commodity, receive);
            }
            affordable
        };

        if !paid {
            peer.deposit(ticket.commodity, receive).await;
            return Settlement::Unpaid;
        }

        self.tick();
        if give > 0 {
            peer.deposit(self.specialty, give).await;
        }
        Settlement::Done
    }

    /// Debit `amount` of the specialty and credit `credit` (if any) by the
    /// same amount in one step, if the specialty is on hand.
    async fn try_release(&self, amount: Amount, credit: Option<Commodity>) -> bool {
        {
            let mut ledger = self.ledger.lock().await;
            if ledger
                .inventory
                .checked_debit(self.specialty, amount)
                .is_none()
            {
                return false;
            }
            if let Some(commodity) = credit {
                ledger.inventory.credit(commodity, amount);
            }
            debug!(
                "[{}] released {} {} -> {}",
                self.specialty, amount, self.specialty, ledger.inventory
            );
        }
        if credit.is_some() {
            self.tick();
        }
        true
    }

    /// [`Broker::try_release`], waiting for the specialty to arrive
    async fn release_specialty(
        &self,
        amount: Amount,
        credit: Option<Commodity>,
        stop: &StopToken,
    ) -> BrokerResult<()> {
        let mut supply = self.supply.subscribe();
        loop {
            supply.borrow_and_update();
            if self.try_release(amount, credit).await {
                return Ok(());
            }

            tokio::select! {
                _ = supply.changed() => {}
                _ = stop.cancelled() => return Err(BrokerError::Cancelled),
            }
        }
    }
}

#[async_trait]
impl Desk for Broker {
    fn specialty(&self) -> Commodity {
        self.specialty
    }

    async fn try_lend(&self, amount: Amount) -> bool {
        amount == 0 || self.try_release(amount, None).await
    }

    async fn deposit(&self, commodity: Commodity, amount: Amount) {
        if amount == 0 {
            return;
        }
        {
            let mut ledger = self.ledger.lock().await;
            ledger.inventory.credit(commodity, amount);
            debug!(
                "[{}] deposited {} {} -> {}",
                self.specialty, amount, commodity, ledger.inventory
            );
        }
        self.tick();
    }

    async fn swap(
        &self,
        offered: Commodity,
        amount: Amount,
        stop: &StopToken,
    ) -> BrokerResult<()> {
        if offered == self.specialty {
            return Err(BrokerError::InvalidSwap {
                offered,
                specialty: self.specialty,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        debug!(
            "[{}] swap requested: {} {} for {} {}",
            self.specialty, amount, offered, amount, self.specialty
        );
        self.release_specialty(amount, Some(offered), stop).await
    }

    async fn lend(&self, amount: Amount, stop: &StopToken) -> BrokerResult<()> {
        if amount == 0 {
            return Ok(());
        }
        debug!("[{}] loan requested: {}", self.specialty, amount);
        self.release_specialty(amount, None, stop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granary_ports::StopSignal;
    use granary_sourcing::SwapSourcing;
    use std::sync::Arc;
    use std::time::Duration;
    use Commodity::*;

    fn swap_market() -> Arc<Market> {
        Arc::new(Market::new(Arc::new(SwapSourcing::new())))
    }

    #[tokio::test]
    async fn test_deliver_credits_specialty() {
        let broker = Broker::new(Rice);
        broker.deliver(7).await;
        broker.deliver(3).await;
        assert_eq!(broker.amount_on_hand().await, Basket::of(Rice, 10));
    }

    #[tokio::test]
    async fn test_empty_request_returns_immediately() {
        let market = swap_market();
        let signal = StopSignal::new();
        market
            .broker(Corn)
            .acquire(&Basket::new(), &market, &signal.token())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_specialty_request_filled_from_inventory() {
        let market = swap_market();
        let signal = StopSignal::new();
        let corn = market.broker(Corn);
        corn.deliver(10).await;

        corn.acquire(&Basket::of(Corn, 4), &market, &signal.token())
            .await
            .unwrap();

        assert_eq!(corn.amount_on_hand().await, Basket::of(Corn, 6));
    }

    #[tokio::test]
    async fn test_swap_with_own_specialty_is_rejected() {
        let broker = Broker::new(Wheat);
        let signal = StopSignal::new();
        let err = broker.swap(Wheat, 1, &signal.token()).await.unwrap_err();
        assert_eq!(
            err,
            BrokerError::InvalidSwap {
                offered: Wheat,
                specialty: Wheat
            }
        );
    }

    #[tokio::test]
    async fn test_swap_exchanges_one_for_one() {
        let broker = Broker::new(Barley);
        let signal = StopSignal::new();
        broker.deliver(5).await;

        broker.swap(Corn, 3, &signal.token()).await.unwrap();

        let held = broker.amount_on_hand().await;
        assert_eq!(held.get(Barley), 2);
        assert_eq!(held.get(Corn), 3);
    }

    #[tokio::test]
    async fn test_swap_waits_for_delivery() {
        let broker = Arc::new(Broker::new(Barley));
        let signal = StopSignal::new();
        broker.deliver(1).await;

        let swapper = {
            let broker = broker.clone();
            let token = signal.token();
            tokio::spawn(async move { broker.swap(Corn, 4, &token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!swapper.is_finished());

        broker.deliver(3).await;
        tokio::time::timeout(Duration::from_secs(1), swapper)
            .await
            .expect("swap should complete after delivery")
            .unwrap()
            .unwrap();

        let held = broker.amount_on_hand().await;
        assert_eq!(held.get(Barley), 0);
        assert_eq!(held.get(Corn), 4);
    }

    #[tokio::test]
    async fn test_cancelled_swap_leaves_inventory_untouched() {
        let broker = Arc::new(Broker::new(Rice));
        let signal = StopSignal::new();
        broker.deliver(2).await;

        let swapper = {
            let broker = broker.clone();
            let token = signal.token();
            tokio::spawn(async move { broker.swap(Wheat, 5, &token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.stop();

        let result = swapper.await.unwrap();
        assert_eq!(result, Err(BrokerError::Cancelled));
        assert_eq!(broker.amount_on_hand().await, Basket::of(Rice, 2));
    }

    #[tokio::test]
    async fn test_try_lend_never_waits() {
        let broker = Broker::new(Corn);
        broker.deliver(2).await;

        assert!(!broker.try_lend(3).await);
        assert_eq!(broker.amount_on_hand().await, Basket::of(Corn, 2));

        assert!(broker.try_lend(2).await);
        assert!(broker.amount_on_hand().await.is_empty());
    }

    #[tokio::test]
    async fn test_deposit_wakes_waiting_swap() {
        let broker = Arc::new(Broker::new(Wheat));
        let signal = StopSignal::new();

        let swapper = {
            let broker = broker.clone();
            let token = signal.token();
            tokio::spawn(async move { broker.swap(Rice, 2, &token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!swapper.is_finished());

        // Returned units count as arrivals just like deliveries
        broker.deposit(Wheat, 2).await;
        tokio::time::timeout(Duration::from_secs(1), swapper)
            .await
            .expect("swap should complete after the deposit")
            .unwrap()
            .unwrap();

        assert_eq!(broker.amount_on_hand().await, Basket::of(Rice, 2));
    }

    #[tokio::test]
    async fn test_request_waits_without_setting_stock_aside() {
        let market = swap_market();
        let signal = StopSignal::new();
        market.broker(Corn).deliver(10).await;

        // BARLEY broker is empty; CORN stays fully visible meanwhile
        let consumer = {
            let market = market.clone();
            let token = signal.token();
            tokio::spawn(async move {
                let request: Basket = [(Corn, 2), (Barley, 4)].into_iter().collect();
                market.broker(Corn).acquire(&request, &market, &token).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());
        assert_eq!(market.broker(Corn).amount_on_hand().await, Basket::of(Corn, 10));

        signal.stop();
        assert_eq!(consumer.await.unwrap(), Err(BrokerError::Cancelled));
        assert_eq!(market.holdings().await, Basket::of(Corn, 10));
    }

    #[tokio::test]
    async fn test_lend_debits_specialty_only() {
        let broker = Broker::new(Corn);
        let signal = StopSignal::new();
        broker.deliver(9).await;

        broker.lend(4, &signal.token()).await.unwrap();

        assert_eq!(broker.amount_on_hand().await, Basket::of(Corn, 5));
    }
}
