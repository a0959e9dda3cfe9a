//! Market accounting state with undo records.
//!
//! [`MarketState`] holds supply, balances, last-purchase timestamps and the
//! reserve. Plans are applied all-or-nothing: every new value is computed
//! with checked arithmetic before the first field is written. Each apply
//! returns a [`MarketUndo`] that restores the exact prior state, used when
//! the outbound transfer after an apply fails.
//!
//! Callers wrap it (via [`Market`](crate::market::Market))
//! in a lock when shared.

use std::collections::{BTreeMap, HashMap};

use ramp_core::error::{InvariantViolation, MarketError};
use ramp_core::types::{Address, Amount, Quantity, Timestamp};

use crate::settlement::{PurchasePlan, SalePlan};

/// Prior values touched by one applied plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketUndo {
    total_supply: Quantity,
    reserve: Amount,
    total_collected: Amount,
    total_paid_out: Amount,
    holder: Address,
    /// Holder balance before the apply; `None` if the holder had no entry.
    balance: Option<Quantity>,
    /// Holder last-purchase time before the apply.
    last_purchase_at: Option<Timestamp>,
}

/// Mutable market accounting. Single logical owner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketState {
    total_supply: Quantity,
    /// Holder → units. Zero balances are removed, never stored.
    balances: HashMap<Address, Quantity>,
    /// Holder → time of most recent purchase.
    last_purchase_at: HashMap<Address, Timestamp>,
    reserve: Amount,
    /// Cumulative cost collected by purchases.
    total_collected: Amount,
    /// Cumulative proceeds paid by sales.
    total_paid_out: Amount,
}

impl MarketState {
    /// Empty market: zero supply, zero reserve.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Quantity {
        self.total_supply
    }

    pub fn reserve(&self) -> Amount {
        self.reserve
    }

    pub fn total_collected(&self) -> Amount {
        self.total_collected
    }

    pub fn total_paid_out(&self) -> Amount {
        self.total_paid_out
    }

    /// Units held by `holder`; zero for unknown holders.
    pub fn balance_of(&self, holder: &Address) -> Quantity {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Time of the holder's most recent purchase, if any.
    pub fn last_purchase_at(&self, holder: &Address) -> Option<Timestamp> {
        self.last_purchase_at.get(holder).copied()
    }

    /// Number of holders with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Balances ordered by address.
    pub fn balances(&self) -> BTreeMap<Address, Quantity> {
        self.balances.iter().map(|(a, q)| (*a, *q)).collect()
    }

    /// Last-purchase times ordered by address.
    pub fn purchase_times(&self) -> BTreeMap<Address, Timestamp> {
        self.last_purchase_at.iter().map(|(a, t)| (*a, *t)).collect()
    }

    fn undo_for(&self, holder: Address) -> MarketUndo {
        MarketUndo {
            total_supply: self.total_supply,
            reserve: self.reserve,
            total_collected: self.total_collected,
            total_paid_out: self.total_paid_out,
            holder,
            balance: self.balances.get(&holder).copied(),
            last_purchase_at: self.last_purchase_at.get(&holder).copied(),
        }
    }

    /// Mint the plan's units to the holder and collect its cost.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Overflow`] if supply, balance, reserve or the
    ///   collected counter would leave the `u128` range; state is untouched.
    pub fn apply_purchase(&mut self, plan: &PurchasePlan) -> Result<MarketUndo, MarketError> {
        let supply = self
            .total_supply
            .checked_add(plan.quantity)
            .ok_or(MarketError::Overflow)?;
        let balance = self
            .balance_of(&plan.holder)
            .checked_add(plan.quantity)
            .ok_or(MarketError::Overflow)?;
        let reserve = self
            .reserve
            .checked_add(plan.cost)
            .ok_or(MarketError::Overflow)?;
        let collected = self
            .total_collected
            .checked_add(plan.cost)
            .ok_or(MarketError::Overflow)?;

        let undo = self.undo_for(plan.holder);
        self.total_supply = supply;
        self.reserve = reserve;
        self.total_collected = collected;
        self.balances.insert(plan.holder, balance);
        self.last_purchase_at.insert(plan.holder, plan.at);
        Ok(undo)
    }

    /// Burn the plan's units from the holder and pay its proceeds.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InsufficientBalance`] if the holder owns fewer units
    /// - [`MarketError::ReserveShortfall`] if the reserve cannot cover proceeds
    /// - [`MarketError::InsufficientSupply`] if supply is below the quantity
    /// - [`MarketError::Overflow`] if the paid-out counter would overflow
    pub fn apply_sale(&mut self, plan: &SalePlan) -> Result<MarketUndo, MarketError> {
        let have = self.balance_of(&plan.holder);
        let balance = have
            .checked_sub(plan.quantity)
            .ok_or(MarketError::InsufficientBalance { have, need: plan.quantity })?;
        let supply = self
            .total_supply
            .checked_sub(plan.quantity)
            .ok_or(MarketError::InsufficientSupply {
                supply: self.total_supply,
                quantity: plan.quantity,
            })?;
        let reserve = self
            .reserve
            .checked_sub(plan.proceeds)
            .ok_or(MarketError::ReserveShortfall {
                reserve: self.reserve,
                proceeds: plan.proceeds,
            })?;
        let paid_out = self
            .total_paid_out
            .checked_add(plan.proceeds)
            .ok_or(MarketError::Overflow)?;

        let undo = self.undo_for(plan.holder);
        self.total_supply = supply;
        self.reserve = reserve;
        self.total_paid_out = paid_out;
        self.set_balance(plan.holder, balance);
        Ok(undo)
    }

    /// Move units between holders. Supply, reserve and purchase times are
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InsufficientBalance`] if `from` owns fewer units
    /// - [`MarketError::Overflow`] if the recipient balance would overflow
    pub fn apply_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        quantity: Quantity,
    ) -> Result<(), MarketError> {
        let have = self.balance_of(from);
        let from_balance = have
            .checked_sub(quantity)
            .ok_or(MarketError::InsufficientBalance { have, need: quantity })?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(quantity)
            .ok_or(MarketError::Overflow)?;

        self.set_balance(*from, from_balance);
        self.set_balance(*to, to_balance);
        Ok(())
    }

    /// Restore the state captured by `undo`.
    pub fn revert(&mut self, undo: MarketUndo) {
        self.total_supply = undo.total_supply;
        self.reserve = undo.reserve;
        self.total_collected = undo.total_collected;
        self.total_paid_out = undo.total_paid_out;
        match undo.balance {
            Some(b) => {
                self.balances.insert(undo.holder, b);
            }
            None => {
                self.balances.remove(&undo.holder);
            }
        }
        match undo.last_purchase_at {
            Some(t) => {
                self.last_purchase_at.insert(undo.holder, t);
            }
            None => {
                self.last_purchase_at.remove(&undo.holder);
            }
        }
    }

    fn set_balance(&mut self, holder: Address, balance: Quantity) {
        if balance == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }

    /// Audit the accounting invariants.
    ///
    /// Checks, in order: no zero-balance entries, supply equals the sum of
    /// balances, reserve equals collected minus paid out.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut sum: Quantity = 0;
        for (holder, balance) in &self.balances {
            if *balance == 0 {
                return Err(InvariantViolation::ZeroBalanceEntry(*holder));
            }
            sum = sum
                .checked_add(*balance)
                .ok_or(InvariantViolation::BalanceOverflow)?;
        }
        if sum != self.total_supply {
            return Err(InvariantViolation::SupplyMismatch {
                supply: self.total_supply,
                sum,
            });
        }

        let expected = self.total_collected.checked_sub(self.total_paid_out);
        if expected != Some(self.reserve) {
            return Err(InvariantViolation::ReserveMismatch {
                reserve: self.reserve,
                collected: self.total_collected,
                paid_out: self.total_paid_out,
            });
        }
        Ok(())
    }
}
