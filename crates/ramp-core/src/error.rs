//! Error types for the Ramp market engine.
use thiserror::Error;

use crate::types::{Address, Amount, Quantity, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("quantity must be positive")] InvalidQuantity,
    #[error("insufficient supply: supply {supply}, quantity {quantity}")] InsufficientSupply { supply: Quantity, quantity: Quantity },
    #[error("arithmetic overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("transfer of {amount} rejected by {recipient}")] Rejected { recipient: Address, amount: Amount },
    #[error("transfer collaborator unavailable: {0}")] Unavailable(String),
}

/// Rejection reasons for market operations.
///
/// Every variant except [`MarketError::TransferFailed`] is raised before any
/// state is touched. `TransferFailed` is raised after the market has rolled
/// the operation back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Zero quantity requested.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// Payment does not cover the curve cost.
    #[error("insufficient funds: paid {payment}, required {required}")]
    InsufficientFunds {
        /// Currency attached to the purchase.
        payment: Amount,
        /// Curve cost of the requested quantity.
        required: Amount,
    },

    /// Holder does not own enough units.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Units currently held.
        have: Quantity,
        /// Units requested.
        need: Quantity,
    },

    /// Sale attempted before the cooldown since the last purchase elapsed.
    #[error("cooldown active: now {now}, sellable at {ready_at}")]
    CooldownActive {
        /// Time of the rejected sale.
        now: Timestamp,
        /// Earliest time the holder may sell.
        ready_at: Timestamp,
    },

    /// Curve proceeds below the caller's minimum.
    #[error("slippage exceeded: proceeds {proceeds} below minimum {minimum}")]
    SlippageExceeded {
        /// Proceeds the curve would pay.
        proceeds: Amount,
        /// Minimum the caller accepts.
        minimum: Amount,
    },

    /// Curve or accounting arithmetic would leave the `u128` range.
    #[error("arithmetic overflow")]
    Overflow,

    /// Reserve cannot cover a sale. Truncated half units on an odd slope can
    /// leave the reserve short when lots are sold in different sizes than
    /// they were bought.
    #[error("reserve shortfall: reserve {reserve}, proceeds {proceeds}")]
    ReserveShortfall {
        /// Reserve at the time of the sale.
        reserve: Amount,
        /// Proceeds owed.
        proceeds: Amount,
    },

    /// Sale would burn more than the outstanding supply.
    #[error("insufficient supply: supply {supply}, quantity {quantity}")]
    InsufficientSupply {
        /// Outstanding supply.
        supply: Quantity,
        /// Units requested.
        quantity: Quantity,
    },

    /// Outbound refund or payout failed; the operation was reverted.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

impl MarketError {
    /// Whether the error signals corrupted market accounting rather than a
    /// rejected request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ReserveShortfall { .. })
    }

    /// Stable snake_case name of the rejection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "invalid_quantity",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::Overflow => "overflow",
            Self::ReserveShortfall { .. } => "reserve_shortfall",
            Self::InsufficientSupply { .. } => "insufficient_supply",
            Self::TransferFailed(_) => "transfer_failed",
        }
    }
}

impl From<CurveError> for MarketError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::InvalidQuantity => Self::InvalidQuantity,
            CurveError::InsufficientSupply { supply, quantity } => {
                Self::InsufficientSupply { supply, quantity }
            }
            CurveError::Overflow => Self::Overflow,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing 0x prefix")] MissingPrefix,
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("supply {supply} != sum of balances {sum}")] SupplyMismatch { supply: Quantity, sum: Quantity },
    #[error("reserve {reserve} != collected {collected} - paid out {paid_out}")] ReserveMismatch { reserve: Amount, collected: Amount, paid_out: Amount },
    #[error("zero balance retained for {0}")] ZeroBalanceEntry(Address),
    #[error("balance sum overflow")] BalanceOverflow,
}

#[derive(Error, Debug)]
pub enum RampError {
    #[error(transparent)] Curve(#[from] CurveError),
    #[error(transparent)] Market(#[from] MarketError),
    #[error(transparent)] Address(#[from] AddressError),
    #[error(transparent)] Invariant(#[from] InvariantViolation),
    #[error("config: {0}")] Config(String),
    #[error("scenario: {0}")] Scenario(String),
}
