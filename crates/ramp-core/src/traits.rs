//! Trait interfaces for the Ramp market engine.
//!
//! These traits define the seams between the market and its collaborators:
//! - [`CurvePricer`] — pure curve math (ramp-curve implements)
//! - [`FundsTransfer`] — outbound currency movement (hosts implement)
//! - [`Clock`] — time source for cooldown checks (ramp-market implements)

use crate::error::{CurveError, TransferError};
use crate::types::{Address, Amount, Quantity, Quote, Side, Timestamp};

/// Pure pricing of supply moves along a bonding curve.
///
/// Implementations must be deterministic and stateless: the same inputs
/// always yield the same amount, and no call mutates anything.
pub trait CurvePricer: Send + Sync {
    /// Instantaneous unit price at `supply`.
    fn spot_price(&self, supply: Quantity) -> Result<Amount, CurveError>;

    /// Currency required to mint `quantity` units on top of `supply`.
    fn cost(&self, supply: Quantity, quantity: Quantity) -> Result<Amount, CurveError>;

    /// Currency released by burning `quantity` units from `supply`.
    ///
    /// Values the vacated interval `[supply - quantity, supply]`.
    fn proceeds(&self, supply: Quantity, quantity: Quantity) -> Result<Amount, CurveError>;

    /// Quote for minting `quantity` units on top of `supply`.
    ///
    /// Default implementation composes [`cost`](Self::cost) and
    /// [`spot_price`](Self::spot_price).
    fn quote_buy(&self, supply: Quantity, quantity: Quantity) -> Result<Quote, CurveError> {
        let amount = self.cost(supply, quantity)?;
        let supply_after = supply.checked_add(quantity).ok_or(CurveError::Overflow)?;
        Ok(Quote {
            side: Side::Buy,
            quantity,
            supply_before: supply,
            supply_after,
            amount,
            price_before: self.spot_price(supply)?,
            price_after: self.spot_price(supply_after)?,
        })
    }

    /// Quote for burning `quantity` units from `supply`.
    fn quote_sell(&self, supply: Quantity, quantity: Quantity) -> Result<Quote, CurveError> {
        let amount = self.proceeds(supply, quantity)?;
        let supply_after = supply
            .checked_sub(quantity)
            .ok_or(CurveError::InsufficientSupply { supply, quantity })?;
        Ok(Quote {
            side: Side::Sell,
            quantity,
            supply_before: supply,
            supply_after,
            amount,
            price_before: self.spot_price(supply)?,
            price_after: self.spot_price(supply_after)?,
        })
    }
}

/// Outbound currency movement: refunds and sale payouts.
///
/// The market decides amounts; this collaborator moves the money. An `Err`
/// makes the market revert the whole operation.
pub trait FundsTransfer: Send + Sync {
    /// Send `amount` from the market reserve to `recipient`.
    fn transfer_out(&self, recipient: &Address, amount: Amount) -> Result<(), TransferError>;
}

/// Source of the current time for cooldown checks.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> Timestamp;
}
