//! # ramp-market — Bonding-curve market ledger.
//!
//! Owns supply, balances, purchase timestamps and the currency reserve, and
//! settles buys and sales against a [`CurvePricer`](ramp_core::traits::CurvePricer):
//! - [`market::Market`] — single-owner state machine, `&mut self` mutations
//! - [`shared::SharedMarket`] — `RwLock` handle serializing writers
//! - [`settlement`] — pure purchase/sale plans and receipts
//! - [`state::MarketState`] — accounting with undo records for rollback
//! - [`clock`], [`funds`] — time source and in-memory payout collaborator
//! - [`config`] — market and simulator configuration
//! - [`scenario`] — scripted market runs for the simulator

pub mod clock;
pub mod config;
pub mod funds;
pub mod market;
pub mod scenario;
pub mod settlement;
pub mod shared;
pub mod state;

pub use clock::{ManualClock, SystemClock};
pub use config::{MarketConfig, SimConfig};
pub use funds::InMemoryFunds;
pub use market::{Market, MarketSnapshot};
pub use scenario::{Scenario, ScenarioReport, ScenarioRunner, Step, StepOutcome};
pub use settlement::{PurchasePlan, PurchaseReceipt, SalePlan, SaleReceipt};
pub use shared::SharedMarket;
pub use state::MarketState;
