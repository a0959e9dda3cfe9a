//! Exact integer integral of a linear price function.
//!
//! For `price(x) = slope * x + base`, the area over `[s, s + q]` is
//! `slope * ((s + q)^2 - s^2) / 2 + base * q`. Expanding the difference of
//! squares gives `q * (2s + q)`, which is odd whenever `q` is odd, so with an
//! odd slope the area may end in a half unit. [`integral`] truncates that
//! half unit. Buys and sales over the same interval share one truncated
//! value, so a buy followed by the matching sale nets to zero.

use ramp_core::error::CurveError;
use ramp_core::types::{Amount, Quantity};

/// Twice the area under `slope * x + base` over `[start, start + quantity]`.
///
/// Computes `slope * quantity * (2 * start + quantity) + 2 * base * quantity`
/// with every step checked.
pub fn doubled_integral(
    slope: u128,
    base: u128,
    start: Quantity,
    quantity: Quantity,
) -> Result<Amount, CurveError> {
    let curve_part = slope_term(slope, start, quantity)?;

    let floor_part = base
        .checked_mul(quantity)
        .and_then(|v| v.checked_mul(2))
        .ok_or(CurveError::Overflow)?;

    curve_part
        .checked_add(floor_part)
        .ok_or(CurveError::Overflow)
}

/// Area under the curve over `[start, start + quantity]`, floored.
///
/// `slope * quantity * (2 * start + quantity) / 2 + base * quantity`. The
/// floor term is an exact integer, so only the slope term is halved.
pub fn integral(
    slope: u128,
    base: u128,
    start: Quantity,
    quantity: Quantity,
) -> Result<Amount, CurveError> {
    let curve_part = slope_term(slope, start, quantity)? / 2;

    let floor_part = base.checked_mul(quantity).ok_or(CurveError::Overflow)?;

    curve_part
        .checked_add(floor_part)
        .ok_or(CurveError::Overflow)
}

/// `slope * quantity * (2 * start + quantity)`, checked.
fn slope_term(slope: u128, start: Quantity, quantity: Quantity) -> Result<Amount, CurveError> {
    // 2s + q
    let span = start
        .checked_mul(2)
        .and_then(|v| v.checked_add(quantity))
        .ok_or(CurveError::Overflow)?;

    slope
        .checked_mul(quantity)
        .and_then(|v| v.checked_mul(span))
        .ok_or(CurveError::Overflow)
}
