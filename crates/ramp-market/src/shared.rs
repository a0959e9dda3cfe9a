//! Thread-safe handle over a [`Market`].
//!
//! Writers hold the write lock for the whole plan/apply/transfer sequence,
//! so two operations never interleave and readers never observe a purchase
//! whose refund is still in flight.

use std::sync::Arc;

use parking_lot::RwLock;

use ramp_core::error::{InvariantViolation, MarketError};
use ramp_core::types::{Address, Amount, Quantity, Quote, Timestamp};

use crate::market::{Market, MarketSnapshot};
use crate::settlement::{PurchaseReceipt, SaleReceipt};

/// Cloneable, `Send + Sync` wrapper serializing access to one market.
#[derive(Clone)]
pub struct SharedMarket {
    inner: Arc<RwLock<Market>>,
}

impl SharedMarket {
    pub fn new(market: Market) -> Self {
        Self {
            inner: Arc::new(RwLock::new(market)),
        }
    }

    /// Run `f` with shared read access.
    pub fn with_read<R>(&self, f: impl FnOnce(&Market) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn submit_purchase(
        &self,
        holder: Address,
        quantity: Quantity,
        payment: Amount,
    ) -> Result<PurchaseReceipt, MarketError> {
        self.inner.write().submit_purchase(holder, quantity, payment)
    }

    pub fn submit_sale(
        &self,
        holder: Address,
        quantity: Quantity,
        minimum_proceeds: Amount,
    ) -> Result<SaleReceipt, MarketError> {
        self.inner.write().submit_sale(holder, quantity, minimum_proceeds)
    }

    pub fn transfer(&self, from: Address, to: Address, quantity: Quantity) -> Result<(), MarketError> {
        self.inner.write().transfer(from, to, quantity)
    }

    pub fn balance_of(&self, holder: &Address) -> Quantity {
        self.inner.read().balance_of(holder)
    }

    pub fn total_supply(&self) -> Quantity {
        self.inner.read().total_supply()
    }

    pub fn reserve(&self) -> Amount {
        self.inner.read().reserve()
    }

    pub fn current_price(&self) -> Result<Amount, MarketError> {
        self.inner.read().current_price()
    }

    pub fn last_purchase_at(&self, holder: &Address) -> Option<Timestamp> {
        self.inner.read().last_purchase_at(holder)
    }

    pub fn cooldown_remaining(&self, holder: &Address) -> u64 {
        self.inner.read().cooldown_remaining(holder)
    }

    pub fn quote_purchase(&self, quantity: Quantity) -> Result<Quote, MarketError> {
        self.inner.read().quote_purchase(quantity)
    }

    pub fn quote_sale(&self, quantity: Quantity) -> Result<Quote, MarketError> {
        self.inner.read().quote_sale(quantity)
    }

    pub fn snapshot(&self) -> Result<MarketSnapshot, MarketError> {
        self.inner.read().snapshot()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.inner.read().check_invariants()
    }
}
