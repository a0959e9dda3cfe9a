//! Shared test helpers for scenario and adversarial tests.

use std::sync::Arc;

use ramp_core::types::{Address, CurveParams, Timestamp};
use ramp_market::{InMemoryFunds, ManualClock, Market};

/// Clock value every helper market starts at.
pub const START: Timestamp = 1_700_000_000;

/// Simple address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

/// A market plus handles to its manual collaborators.
pub struct TestMarket {
    pub market: Market,
    pub funds: Arc<InMemoryFunds>,
    pub clock: Arc<ManualClock>,
}

impl TestMarket {
    pub fn new(params: CurveParams) -> Self {
        let funds = Arc::new(InMemoryFunds::new());
        let clock = Arc::new(ManualClock::new(START));
        let market = Market::new(params, funds.clone(), clock.clone());
        Self { market, funds, clock }
    }

    /// Slope 2, no floor, no cooldown.
    pub fn linear() -> Self {
        Self::new(CurveParams::linear(2))
    }

    /// Slope 2, no floor, with the given cooldown.
    pub fn with_cooldown(secs: u64) -> Self {
        Self::new(CurveParams::linear(2).with_cooldown(secs))
    }

    /// Buy paying exactly the quoted cost.
    pub fn buy_exact(&mut self, seed: u8, quantity: u128) -> u128 {
        let cost = self.market.quote_purchase(quantity).unwrap().amount;
        self.market.submit_purchase(addr(seed), quantity, cost).unwrap();
        cost
    }
}
