//! The market ledger.
//!
//! [`Market`] composes the accounting [`MarketState`] with the linear curve
//! its [`CurveParams`] describe, a payout collaborator and a clock. Every mutating call follows the same
//! shape: build a plan against current state (no mutation), apply it
//! (all-or-nothing), run the outbound transfer, and revert the applied plan
//! if that transfer fails. A caller therefore sees either the full effect of
//! an operation or none of it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use ramp_core::error::{InvariantViolation, MarketError};
use ramp_core::traits::{Clock, CurvePricer, FundsTransfer};
use ramp_core::types::{Address, Amount, CurveParams, Quantity, Quote, Timestamp};
use ramp_curve::LinearCurve;

use crate::settlement::{PurchasePlan, PurchaseReceipt, SalePlan, SaleReceipt};
use crate::state::MarketState;

/// Point-in-time view of the whole market.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub params: CurveParams,
    pub total_supply: Quantity,
    pub reserve: Amount,
    pub current_price: Amount,
    pub total_collected: Amount,
    pub total_paid_out: Amount,
    pub balances: BTreeMap<Address, Quantity>,
    pub last_purchase_at: BTreeMap<Address, Timestamp>,
}

/// A single bonding-curve market instance.
///
/// Mutations take `&mut self`. Wrap in
/// [`SharedMarket`](crate::shared::SharedMarket) for shared access.
pub struct Market {
    params: CurveParams,
    curve: LinearCurve,
    funds: Arc<dyn FundsTransfer>,
    clock: Arc<dyn Clock>,
    state: MarketState,
}

impl Market {
    /// Create an empty market priced by the linear curve in `params`.
    ///
    /// The curve is derived from `params` and never replaced, so the
    /// parameters a snapshot reports are the ones every quote used.
    pub fn new(params: CurveParams, funds: Arc<dyn FundsTransfer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            params,
            curve: LinearCurve::from_params(&params),
            funds,
            clock,
            state: MarketState::new(),
        }
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    pub fn curve(&self) -> &LinearCurve {
        &self.curve
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn balance_of(&self, holder: &Address) -> Quantity {
        self.state.balance_of(holder)
    }

    pub fn total_supply(&self) -> Quantity {
        self.state.total_supply()
    }

    pub fn reserve(&self) -> Amount {
        self.state.reserve()
    }

    /// Unit price at the current supply.
    pub fn current_price(&self) -> Result<Amount, MarketError> {
        Ok(self.curve.spot_price(self.state.total_supply())?)
    }

    pub fn last_purchase_at(&self, holder: &Address) -> Option<Timestamp> {
        self.state.last_purchase_at(holder)
    }

    /// Time at which `holder` may sell again, if a cooldown gates them at all.
    pub fn sellable_at(&self, holder: &Address) -> Option<Timestamp> {
        if self.params.cooldown_secs == 0 {
            return None;
        }
        self.state
            .last_purchase_at(holder)
            .map(|t| t.saturating_add(self.params.cooldown_secs))
    }

    /// Seconds until `holder` may sell; zero when not gated.
    pub fn cooldown_remaining(&self, holder: &Address) -> u64 {
        self.sellable_at(holder)
            .map(|ready| ready.saturating_sub(self.clock.now()))
            .unwrap_or(0)
    }

    /// Price of minting `quantity` at the current supply.
    pub fn quote_purchase(&self, quantity: Quantity) -> Result<Quote, MarketError> {
        Ok(self.curve.quote_buy(self.state.total_supply(), quantity)?)
    }

    /// Proceeds of burning `quantity` at the current supply.
    pub fn quote_sale(&self, quantity: Quantity) -> Result<Quote, MarketError> {
        Ok(self.curve.quote_sell(self.state.total_supply(), quantity)?)
    }

    pub fn snapshot(&self) -> Result<MarketSnapshot, MarketError> {
        Ok(MarketSnapshot {
            params: self.params,
            total_supply: self.state.total_supply(),
            reserve: self.state.reserve(),
            current_price: self.current_price()?,
            total_collected: self.state.total_collected(),
            total_paid_out: self.state.total_paid_out(),
            balances: self.state.balances(),
            last_purchase_at: self.state.purchase_times(),
        })
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.state.check_invariants()
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    /// Validate a purchase against current state without mutating it.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidQuantity`] for zero quantity
    /// - [`MarketError::Overflow`] if the curve cost is unrepresentable
    /// - [`MarketError::InsufficientFunds`] if `payment` is below the cost
    pub fn plan_purchase(
        &self,
        holder: Address,
        quantity: Quantity,
        payment: Amount,
    ) -> Result<PurchasePlan, MarketError> {
        if quantity == 0 {
            return Err(MarketError::InvalidQuantity);
        }

        let required = self.curve.cost(self.state.total_supply(), quantity)?;
        if payment < required {
            return Err(MarketError::InsufficientFunds { payment, required });
        }

        Ok(PurchasePlan {
            holder,
            quantity,
            cost: required,
            refund: payment - required,
            at: self.clock.now(),
        })
    }

    /// Validate a sale against current state without mutating it.
    ///
    /// Checks run in order: quantity, balance, cooldown, slippage, reserve.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidQuantity`] for zero quantity
    /// - [`MarketError::InsufficientBalance`] if the holder owns fewer units
    /// - [`MarketError::CooldownActive`] if the holder purchased too recently
    /// - [`MarketError::SlippageExceeded`] if proceeds fall below `minimum_proceeds`
    /// - [`MarketError::ReserveShortfall`] if the reserve cannot pay (fatal)
    pub fn plan_sale(
        &self,
        holder: Address,
        quantity: Quantity,
        minimum_proceeds: Amount,
    ) -> Result<SalePlan, MarketError> {
        if quantity == 0 {
            return Err(MarketError::InvalidQuantity);
        }

        let have = self.state.balance_of(&holder);
        if have < quantity {
            return Err(MarketError::InsufficientBalance { have, need: quantity });
        }

        if let Some(ready_at) = self.sellable_at(&holder) {
            let now = self.clock.now();
            if now < ready_at {
                return Err(MarketError::CooldownActive { now, ready_at });
            }
        }

        let proceeds = self.curve.proceeds(self.state.total_supply(), quantity)?;
        if proceeds < minimum_proceeds {
            return Err(MarketError::SlippageExceeded {
                proceeds,
                minimum: minimum_proceeds,
            });
        }

        let reserve = self.state.reserve();
        if reserve < proceeds {
            error!(
                %holder,
                reserve,
                proceeds,
                supply = self.state.total_supply(),
                "reserve cannot cover sale"
            );
            return Err(MarketError::ReserveShortfall { reserve, proceeds });
        }

        Ok(SalePlan {
            holder,
            quantity,
            proceeds,
        })
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Mint `quantity` units to `holder` for `payment`, refunding any excess.
    ///
    /// A failed refund reverts the purchase and returns
    /// [`MarketError::TransferFailed`].
    pub fn submit_purchase(
        &mut self,
        holder: Address,
        quantity: Quantity,
        payment: Amount,
    ) -> Result<PurchaseReceipt, MarketError> {
        let plan = self.plan_purchase(holder, quantity, payment)?;
        let undo = self.state.apply_purchase(&plan)?;

        if plan.refund > 0 {
            if let Err(e) = self.funds.transfer_out(&holder, plan.refund) {
                warn!(%holder, refund = plan.refund, error = %e, "refund failed; reverting purchase");
                self.state.revert(undo);
                return Err(e.into());
            }
        }

        let receipt = PurchaseReceipt::settled(&plan, self.state.total_supply());
        debug!(
            %holder,
            quantity,
            cost = plan.cost,
            refund = plan.refund,
            supply = receipt.supply_after,
            "purchase settled"
        );
        Ok(receipt)
    }

    /// Burn `quantity` units from `holder` and pay the curve proceeds.
    ///
    /// A failed payout reverts the sale and returns
    /// [`MarketError::TransferFailed`].
    pub fn submit_sale(
        &mut self,
        holder: Address,
        quantity: Quantity,
        minimum_proceeds: Amount,
    ) -> Result<SaleReceipt, MarketError> {
        let plan = self.plan_sale(holder, quantity, minimum_proceeds)?;
        let undo = self.state.apply_sale(&plan)?;

        if plan.proceeds > 0 {
            if let Err(e) = self.funds.transfer_out(&holder, plan.proceeds) {
                warn!(%holder, proceeds = plan.proceeds, error = %e, "payout failed; reverting sale");
                self.state.revert(undo);
                return Err(e.into());
            }
        }

        let receipt = SaleReceipt::settled(&plan, self.state.total_supply());
        debug!(
            %holder,
            quantity,
            proceeds = plan.proceeds,
            supply = receipt.supply_after,
            "sale settled"
        );
        Ok(receipt)
    }

    /// Move `quantity` units from `from` to `to`.
    ///
    /// The recipient does not inherit the sender's purchase time, so units
    /// received this way are never cooldown-gated for the recipient.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        quantity: Quantity,
    ) -> Result<(), MarketError> {
        if quantity == 0 {
            return Err(MarketError::InvalidQuantity);
        }
        self.state.apply_transfer(&from, &to, quantity)?;
        debug!(%from, %to, quantity, "units transferred");
        Ok(())
    }
}
