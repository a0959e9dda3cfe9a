//! # ramp-curve — Linear bonding-curve pricer.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! The curve prices unit `x` at `slope * x + base_price`. Moving supply from
//! `s` to `s + q` costs the integral of that line over `[s, s + q]`:
//! - **Floor pricing**: `slope * q * (2s + q) / 2 + base_price * q` with the
//!   division truncated. An odd slope can leave a half unit, which is dropped.
//! - **One price per interval**: selling `q` units from supply `s` pays exactly
//!   what buying them from `s - q` cost, so round trips are exact.
//! - **Checked `u128`**: every intermediate term is checked; overflow is an
//!   error, never a wrap.

pub mod integral;
pub mod linear;

pub use integral::{doubled_integral, integral};
pub use linear::LinearCurve;
