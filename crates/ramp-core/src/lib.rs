//! # ramp-core
//! Foundation types and traits for the Ramp bonding-curve market.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
