//! Scripted market runs.
//!
//! A [`Scenario`] is a JSON list of [`Step`]s replayed against a fresh market
//! backed by a [`ManualClock`] and [`InMemoryFunds`]. Failed steps are
//! recorded, not propagated, so a script can assert that an operation is
//! rejected and carry on.
//!
//! Amounts in scripts are JSON integers and must fit in a `u64`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ramp_core::error::RampError;
use ramp_core::traits::Clock;
use ramp_core::types::{Address, Amount, CurveParams, Quantity, Timestamp};

use crate::clock::ManualClock;
use crate::funds::InMemoryFunds;
use crate::market::{Market, MarketSnapshot};
use crate::settlement::{PurchaseReceipt, SaleReceipt};

/// A script: starting clock value plus the steps to replay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Scenario {
    #[serde(default)]
    pub start_time: Timestamp,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, RampError> {
        serde_json::from_str(text).map_err(|e| RampError::Scenario(e.to_string()))
    }

    /// Replay against a fresh market built from `params`.
    pub fn run(&self, params: CurveParams, stop_on_error: bool) -> Result<ScenarioReport, RampError> {
        ScenarioRunner::new(params, self.start_time).run(&self.steps, stop_on_error)
    }
}

/// One scripted operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Buy {
        holder: Address,
        quantity: Quantity,
        payment: Amount,
    },
    Sell {
        holder: Address,
        quantity: Quantity,
        #[serde(default)]
        min_proceeds: Amount,
    },
    Transfer {
        from: Address,
        to: Address,
        quantity: Quantity,
    },
    Advance {
        seconds: u64,
    },
    RejectPayouts {
        holder: Address,
    },
    AcceptPayouts {
        holder: Address,
    },
    /// Audit the market invariants.
    Check,
}

/// What a step did.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Purchased(PurchaseReceipt),
    Sold(SaleReceipt),
    Transferred {
        from: Address,
        to: Address,
        quantity: Quantity,
    },
    Advanced {
        now: Timestamp,
    },
    PayoutsRejected {
        holder: Address,
    },
    PayoutsAccepted {
        holder: Address,
    },
    Checked {
        total_supply: Quantity,
        reserve: Amount,
    },
    Failed {
        /// Stable snake_case error name.
        kind: String,
        message: String,
    },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn failed(kind: &str, err: impl std::fmt::Display) -> Self {
        Self::Failed {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub outcome: StepOutcome,
}

/// Result of replaying a scenario.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    pub failures: usize,
    /// Whether replay stopped early at a failed step.
    pub halted: bool,
    pub final_snapshot: MarketSnapshot,
}

/// Fresh market plus the manual collaborators a script drives.
pub struct ScenarioRunner {
    market: Market,
    clock: Arc<ManualClock>,
    funds: Arc<InMemoryFunds>,
}

impl ScenarioRunner {
    pub fn new(params: CurveParams, start_time: Timestamp) -> Self {
        let clock = Arc::new(ManualClock::new(start_time));
        let funds = Arc::new(InMemoryFunds::new());
        let market = Market::new(params, funds.clone(), clock.clone());
        Self { market, clock, funds }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn funds(&self) -> &InMemoryFunds {
        &self.funds
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Execute one step.
    pub fn apply(&mut self, step: &Step) -> StepOutcome {
        match step {
            Step::Buy {
                holder,
                quantity,
                payment,
            } => match self.market.submit_purchase(*holder, *quantity, *payment) {
                Ok(receipt) => StepOutcome::Purchased(receipt),
                Err(e) => StepOutcome::failed(e.kind(), e),
            },
            Step::Sell {
                holder,
                quantity,
                min_proceeds,
            } => match self.market.submit_sale(*holder, *quantity, *min_proceeds) {
                Ok(receipt) => StepOutcome::Sold(receipt),
                Err(e) => StepOutcome::failed(e.kind(), e),
            },
            Step::Transfer { from, to, quantity } => {
                match self.market.transfer(*from, *to, *quantity) {
                    Ok(()) => StepOutcome::Transferred {
                        from: *from,
                        to: *to,
                        quantity: *quantity,
                    },
                    Err(e) => StepOutcome::failed(e.kind(), e),
                }
            }
            Step::Advance { seconds } => StepOutcome::Advanced {
                now: self.clock.advance(*seconds),
            },
            Step::RejectPayouts { holder } => {
                self.funds.reject(*holder);
                StepOutcome::PayoutsRejected { holder: *holder }
            }
            Step::AcceptPayouts { holder } => {
                self.funds.accept(holder);
                StepOutcome::PayoutsAccepted { holder: *holder }
            }
            Step::Check => match self.market.check_invariants() {
                Ok(()) => StepOutcome::Checked {
                    total_supply: self.market.total_supply(),
                    reserve: self.market.reserve(),
                },
                Err(e) => StepOutcome::failed("invariant_violation", e),
            },
        }
    }

    /// Execute `steps` in order and report every outcome.
    ///
    /// With `stop_on_error` the run halts after the first failed step.
    pub fn run(mut self, steps: &[Step], stop_on_error: bool) -> Result<ScenarioReport, RampError> {
        info!(steps = steps.len(), start = self.clock.now(), "scenario started");

        let mut reports = Vec::with_capacity(steps.len());
        let mut failures = 0;
        let mut halted = false;

        for (index, step) in steps.iter().enumerate() {
            let outcome = self.apply(step);
            if let StepOutcome::Failed { kind, message } = &outcome {
                failures += 1;
                debug!(index, kind = %kind, message = %message, "step failed");
            }
            let failed = outcome.is_failure();
            reports.push(StepReport {
                index,
                step: step.clone(),
                outcome,
            });
            if failed && stop_on_error {
                halted = true;
                break;
            }
        }

        let final_snapshot = self.market.snapshot()?;
        info!(
            executed = reports.len(),
            failures,
            halted,
            supply = final_snapshot.total_supply,
            reserve = final_snapshot.reserve,
            "scenario finished"
        );

        Ok(ScenarioReport {
            steps: reports,
            failures,
            halted,
            final_snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x0101010101010101010101010101010101010101";
    const B: &str = "0x0202020202020202020202020202020202020202";

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn parse_script() {
        let json = format!(
            r#"{{
                "start_time": 100,
                "steps": [
                    {{"op": "buy", "holder": "{A}", "quantity": 1000, "payment": 1000000}},
                    {{"op": "advance", "seconds": 60}},
                    {{"op": "sell", "holder": "{A}", "quantity": 10}},
                    {{"op": "transfer", "from": "{A}", "to": "{B}", "quantity": 5}},
                    {{"op": "reject_payouts", "holder": "{B}"}},
                    {{"op": "accept_payouts", "holder": "{B}"}},
                    {{"op": "check"}}
                ]
            }}"#
        );
        let s = Scenario::from_json(&json).unwrap();
        assert_eq!(s.start_time, 100);
        assert_eq!(s.steps.len(), 7);
        assert_eq!(
            s.steps[2],
            Step::Sell { holder: addr(A), quantity: 10, min_proceeds: 0 }
        );
        assert_eq!(s.steps[6], Step::Check);
    }

    #[test]
    fn parse_rejects_unknown_op() {
        let err = Scenario::from_json(r#"{"steps":[{"op":"mint"}]}"#).unwrap_err();
        assert!(matches!(err, RampError::Scenario(_)));
    }

    #[test]
    fn start_time_defaults_to_zero() {
        let s = Scenario::from_json(r#"{"steps":[]}"#).unwrap();
        assert_eq!(s.start_time, 0);
    }

    #[test]
    fn run_records_failures_and_continues() {
        let scenario = Scenario {
            start_time: 0,
            steps: vec![
                Step::Buy { holder: addr(A), quantity: 1000, payment: 999_999 },
                Step::Buy { holder: addr(A), quantity: 1000, payment: 1_000_000 },
                Step::Check,
            ],
        };
        let report = scenario.run(CurveParams::linear(2), false).unwrap();
        assert_eq!(report.failures, 1);
        assert!(!report.halted);
        assert_eq!(report.steps.len(), 3);
        match &report.steps[0].outcome {
            StepOutcome::Failed { kind, .. } => assert_eq!(kind, "insufficient_funds"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            report.steps[2].outcome,
            StepOutcome::Checked { total_supply: 1000, reserve: 1_000_000 }
        );
        assert_eq!(report.final_snapshot.total_supply, 1000);
    }

    #[test]
    fn run_stops_on_error() {
        let scenario = Scenario {
            start_time: 0,
            steps: vec![
                Step::Sell { holder: addr(A), quantity: 1, min_proceeds: 0 },
                Step::Buy { holder: addr(A), quantity: 1, payment: 1 },
            ],
        };
        let report = scenario.run(CurveParams::linear(2), true).unwrap();
        assert!(report.halted);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.final_snapshot.total_supply, 0);
    }

    #[test]
    fn advance_moves_clock_for_cooldown() {
        let mut runner = ScenarioRunner::new(CurveParams::linear(2).with_cooldown(60), 1_000);
        runner.apply(&Step::Buy { holder: addr(A), quantity: 10, payment: 100 });
        let blocked = runner.apply(&Step::Sell { holder: addr(A), quantity: 10, min_proceeds: 0 });
        assert!(matches!(&blocked, StepOutcome::Failed { kind, .. } if kind == "cooldown_active"));
        assert_eq!(
            runner.apply(&Step::Advance { seconds: 60 }),
            StepOutcome::Advanced { now: 1_060 }
        );
        let sold = runner.apply(&Step::Sell { holder: addr(A), quantity: 10, min_proceeds: 0 });
        assert!(matches!(sold, StepOutcome::Sold(ref r) if r.proceeds == 100));
        assert_eq!(runner.funds().credited(&addr(A)), 100);
    }

    #[test]
    fn rejected_payout_rolls_back_sale() {
        let mut runner = ScenarioRunner::new(CurveParams::linear(2), 0);
        runner.apply(&Step::Buy { holder: addr(A), quantity: 10, payment: 100 });
        runner.apply(&Step::RejectPayouts { holder: addr(A) });
        let out = runner.apply(&Step::Sell { holder: addr(A), quantity: 10, min_proceeds: 0 });
        assert!(matches!(&out, StepOutcome::Failed { kind, .. } if kind == "transfer_failed"));
        assert_eq!(runner.market().balance_of(&addr(A)), 10);

        runner.apply(&Step::AcceptPayouts { holder: addr(A) });
        let out = runner.apply(&Step::Sell { holder: addr(A), quantity: 10, min_proceeds: 0 });
        assert!(!out.is_failure());
    }

    #[test]
    fn outcome_json_is_tagged_by_status() {
        let out = StepOutcome::Advanced { now: 5 };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["status"], "advanced");
        assert_eq!(v["now"], 5);
    }
}
