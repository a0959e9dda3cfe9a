//! Settlement plans and receipts.
//!
//! A plan is the decision half of an operation: every amount the market owes
//! or collects, computed and validated against a read-only view of state.
//! Applying a plan mutates state; the outbound transfer runs afterwards and a
//! failure reverts the applied plan. Receipts report what actually settled.

use serde::{Deserialize, Serialize};

use ramp_core::types::{Address, Amount, Quantity, Timestamp};

/// Validated purchase, ready to apply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PurchasePlan {
    pub holder: Address,
    pub quantity: Quantity,
    /// Curve cost collected into the reserve.
    pub cost: Amount,
    /// Overpayment returned to the holder.
    pub refund: Amount,
    /// Timestamp recorded as the holder's last purchase.
    pub at: Timestamp,
}

/// Validated sale, ready to apply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SalePlan {
    pub holder: Address,
    pub quantity: Quantity,
    /// Curve proceeds paid out of the reserve.
    pub proceeds: Amount,
}

/// Outcome of a settled purchase.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub holder: Address,
    pub quantity: Quantity,
    pub cost: Amount,
    pub refund: Amount,
    pub supply_after: Quantity,
    pub purchased_at: Timestamp,
}

impl PurchaseReceipt {
    pub(crate) fn settled(plan: &PurchasePlan, supply_after: Quantity) -> Self {
        Self {
            holder: plan.holder,
            quantity: plan.quantity,
            cost: plan.cost,
            refund: plan.refund,
            supply_after,
            purchased_at: plan.at,
        }
    }

    /// Total currency the buyer attached.
    pub fn payment(&self) -> Amount {
        self.cost + self.refund
    }
}

/// Outcome of a settled sale.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SaleReceipt {
    pub holder: Address,
    pub quantity: Quantity,
    pub proceeds: Amount,
    pub supply_after: Quantity,
}

impl SaleReceipt {
    pub(crate) fn settled(plan: &SalePlan, supply_after: Quantity) -> Self {
        Self {
            holder: plan.holder,
            quantity: plan.quantity,
            proceeds: plan.proceeds,
            supply_after,
        }
    }
}
