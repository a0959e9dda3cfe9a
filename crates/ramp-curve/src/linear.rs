//! Linear bonding-curve pricer implementing the [`CurvePricer`] trait.
//!
//! Prices every supply move by integrating `slope * x + base_price` over the
//! moved interval and truncating any half unit. A sale is priced as the buy
//! of the interval it vacates, so both directions agree to the unit.

use serde::{Deserialize, Serialize};
use tracing::trace;

use ramp_core::error::CurveError;
use ramp_core::traits::CurvePricer;
use ramp_core::types::{Amount, CurveParams, Quantity};

use crate::integral::integral;

/// The production pricer: `price(x) = slope * x + base_price`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCurve {
    slope: u128,
    base_price: u128,
}

impl LinearCurve {
    /// Create a curve with the given slope and price floor.
    pub fn new(slope: u128, base_price: u128) -> Self {
        Self { slope, base_price }
    }

    /// Create the curve described by market parameters.
    pub fn from_params(params: &CurveParams) -> Self {
        Self::new(params.slope, params.base_price)
    }

    pub fn slope(&self) -> u128 {
        self.slope
    }

    pub fn base_price(&self) -> u128 {
        self.base_price
    }

    /// Largest quantity whose cost on top of `supply` fits within `budget`.
    ///
    /// Returns 0 when not even one unit is affordable. Cost is monotonic in
    /// quantity, so a binary search over `[0, hi]` suffices; `hi` is the
    /// budget itself on a curve with a positive floor, otherwise bounded by
    /// the first unit priced above the budget.
    pub fn max_purchasable(&self, supply: Quantity, budget: Amount) -> Result<Quantity, CurveError> {
        let mut lo: Quantity = 0;
        let mut hi: Quantity = self.search_bound(supply, budget);

        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            match self.cost(supply, mid) {
                Ok(c) if c <= budget => lo = mid,
                Ok(_) | Err(CurveError::Overflow) => hi = mid - 1,
                Err(e) => return Err(e),
            }
        }

        trace!(supply, budget, quantity = lo, "max purchasable");
        Ok(lo)
    }

    fn search_bound(&self, supply: Quantity, budget: Amount) -> Quantity {
        if self.base_price > 0 {
            return budget / self.base_price;
        }
        if self.slope == 0 {
            // Free units: anything up to the representable supply.
            return Quantity::MAX - supply;
        }
        // cost >= (slope * q^2 - 1) / 2, so q^2 <= 2 * (budget / slope) + 2.
        let ratio = budget / self.slope;
        isqrt(ratio.saturating_mul(2).saturating_add(2)).saturating_add(1)
    }
}

impl From<CurveParams> for LinearCurve {
    fn from(params: CurveParams) -> Self {
        Self::from_params(&params)
    }
}

/// Integer square root (floor) via Newton iteration.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = x.div_ceil(2);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

impl CurvePricer for LinearCurve {
    fn spot_price(&self, supply: Quantity) -> Result<Amount, CurveError> {
        self.slope
            .checked_mul(supply)
            .and_then(|v| v.checked_add(self.base_price))
            .ok_or(CurveError::Overflow)
    }

    fn cost(&self, supply: Quantity, quantity: Quantity) -> Result<Amount, CurveError> {
        if quantity == 0 {
            return Err(CurveError::InvalidQuantity);
        }
        integral(self.slope, self.base_price, supply, quantity)
    }

    fn proceeds(&self, supply: Quantity, quantity: Quantity) -> Result<Amount, CurveError> {
        if quantity == 0 {
            return Err(CurveError::InvalidQuantity);
        }
        let start = supply
            .checked_sub(quantity)
            .ok_or(CurveError::InsufficientSupply { supply, quantity })?;
        self.cost(start, quantity)
    }
}
