//! Scenario and adversarial test suite for Ramp.
//!
//! Integration tests drive the market through its public surface only and
//! check the accounting invariants after every step under randomized inputs.

pub mod helpers;
