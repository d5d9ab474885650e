use granary_core::Amount;

/// What a broker gets and gives when it covers one shortfall with a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Terms {
    /// Units of the peer's specialty credited to the initiator
    pub receive: Amount,
    /// Units of the initiator's specialty paid to the peer
    pub give: Amount,
}

impl Terms {
    /// True if these terms move nothing
    pub fn is_empty(&self) -> bool {
        self.receive == 0
    }
}

/// Port for pricing a non-specialty shortfall with a peer broker
///
/// The broker plans terms under its own lock, then settles them without
/// holding any lock or stock in reserve: it takes `receive` from the peer
/// with [`Desk::try_lend`](crate::Desk::try_lend), pays `give` from its spare
/// specialty under its own lock, and deposits the payment with the peer. If
/// the spare is gone by then, the received units go back to the peer.
pub trait SourcingStrategy: Send + Sync {
    /// Decide how much to source given the shortfall of the peer's commodity
    /// and the initiator's spare specialty stock.
    fn terms(&self, shortfall: Amount, spare: Amount) -> Terms;

    /// Get the name of the strategy
    fn name(&self) -> &str;
}
