//! In-memory payout collaborator.
//!
//! [`InMemoryFunds`] implements [`FundsTransfer`] by crediting per-address
//! currency balances. Recipients can be marked as rejecting, which makes
//! every payout to them fail, standing in for a receiver that
//! refuses incoming value.

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tracing::debug;

use ramp_core::error::TransferError;
use ramp_core::traits::FundsTransfer;
use ramp_core::types::{Address, Amount};

/// Currency ledger credited by market refunds and payouts.
#[derive(Debug, Default)]
pub struct InMemoryFunds {
    /// Address → currency received from the market.
    credited: DashMap<Address, Amount>,
    /// Addresses whose payouts fail.
    rejecting: DashSet<Address>,
    /// Successful transfers in order.
    log: Mutex<Vec<(Address, Amount)>>,
}

impl InMemoryFunds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every payout to `recipient` fail.
    pub fn reject(&self, recipient: Address) {
        self.rejecting.insert(recipient);
    }

    /// Undo [`reject`](Self::reject).
    pub fn accept(&self, recipient: &Address) {
        self.rejecting.remove(recipient);
    }

    /// Currency credited to `recipient` so far.
    pub fn credited(&self, recipient: &Address) -> Amount {
        self.credited.get(recipient).map(|v| *v).unwrap_or(0)
    }

    /// Sum of all successful transfers.
    pub fn total_sent(&self) -> Amount {
        self.log.lock().iter().map(|(_, a)| *a).sum()
    }

    /// Successful transfers in the order they happened.
    pub fn transfers(&self) -> Vec<(Address, Amount)> {
        self.log.lock().clone()
    }
}

impl FundsTransfer for InMemoryFunds {
    fn transfer_out(&self, recipient: &Address, amount: Amount) -> Result<(), TransferError> {
        if self.rejecting.contains(recipient) {
            return Err(TransferError::Rejected {
                recipient: *recipient,
                amount,
            });
        }

        let mut entry = self.credited.entry(*recipient).or_insert(0);
        let next = entry
            .checked_add(amount)
            .ok_or_else(|| TransferError::Unavailable(format!("credit overflow for {recipient}")))?;
        *entry = next;
        drop(entry);

        self.log.lock().push((*recipient, amount));
        debug!(%recipient, amount, "funds transferred");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    #[test]
    fn transfer_credits_recipient() {
        let f = InMemoryFunds::new();
        f.transfer_out(&addr(1), 10).unwrap();
        f.transfer_out(&addr(1), 5).unwrap();
        assert_eq!(f.credited(&addr(1)), 15);
        assert_eq!(f.credited(&addr(2)), 0);
        assert_eq!(f.total_sent(), 15);
        assert_eq!(f.transfers(), vec![(addr(1), 10), (addr(1), 5)]);
    }

    #[test]
    fn rejecting_recipient_fails() {
        let f = InMemoryFunds::new();
        f.reject(addr(1));
        assert_eq!(
            f.transfer_out(&addr(1), 10),
            Err(TransferError::Rejected { recipient: addr(1), amount: 10 })
        );
        assert_eq!(f.credited(&addr(1)), 0);
        assert!(f.transfers().is_empty());
    }

    #[test]
    fn accept_restores_payouts() {
        let f = InMemoryFunds::new();
        f.reject(addr(1));
        f.accept(&addr(1));
        f.transfer_out(&addr(1), 3).unwrap();
        assert_eq!(f.credited(&addr(1)), 3);
    }

    #[test]
    fn credit_overflow_is_unavailable() {
        let f = InMemoryFunds::new();
        f.transfer_out(&addr(1), u128::MAX).unwrap();
        assert!(matches!(
            f.transfer_out(&addr(1), 1),
            Err(TransferError::Unavailable(_))
        ));
        assert_eq!(f.credited(&addr(1)), u128::MAX);
    }
}
