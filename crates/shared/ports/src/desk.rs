use async_trait::async_trait;
use granary_core::{Amount, Commodity};

use crate::error::BrokerResult;
use crate::stop::StopToken;

/// Port for the peer-facing side of a broker
///
/// This is everything one broker may ask of another. `try_lend` and
/// `deposit` never wait for stock, so a broker can negotiate with a peer
/// without holding anything back while the peer is short. `swap` and `lend`
/// wait until the callee holds enough of its own specialty, and give up with
/// `BrokerError::Cancelled` once the stop token fires. A cancelled call has
/// not mutated the callee.
#[async_trait]
pub trait Desk: Send + Sync {
    /// The commodity this desk receives deliveries of
    fn specialty(&self) -> Commodity;

    /// Release `amount` of this desk's specialty if it is on hand right now.
    ///
    /// Returns `false` and leaves the desk untouched otherwise. The caller
    /// becomes responsible for the released units.
    async fn try_lend(&self, amount: Amount) -> bool;

    /// Credit `amount` of `commodity`: a payment, or released units handed
    /// back.
    async fn deposit(&self, commodity: Commodity, amount: Amount);

    /// Take `amount` of `offered` in exchange for the same amount of this
    /// desk's specialty (1:1), both in one step once the specialty is on hand.
    async fn swap(
        &self,
        offered: Commodity,
        amount: Amount,
        stop: &StopToken,
    ) -> BrokerResult<()>;

    /// Like [`Desk::try_lend`], waiting for the specialty to arrive.
    async fn lend(&self, amount: Amount, stop: &StopToken) -> BrokerResult<()>;
}
