//! Simulation controller.

use std::time::Duration;

use swapdesk_common::{SwapState, Symbol};
use swapdesk_session::{DeskSnapshot, SwapDesk};
use tracing::{info, warn};

use crate::metrics::SimulationMetrics;
use crate::scenario::{AssertCondition, ExpectedState, Scenario, ScenarioStep};

/// Drives a scenario against a swap desk.
pub struct SimulationController {
    desk: SwapDesk,
    metrics: SimulationMetrics,
}

impl SimulationController {
    /// Create a controller for a desk whose prices are already loaded.
    pub fn new(desk: SwapDesk, scenario_name: &str) -> Self {
        Self {
            desk,
            metrics: SimulationMetrics::new(scenario_name),
        }
    }

    /// Record the catalog ingestion summary.
    pub fn set_ingest(&mut self, report: swapdesk_fx::IngestReport) {
        self.metrics.ingest = Some(report);
    }

    /// Run every step of a scenario.
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!(
            scenario = %scenario.name,
            description = %scenario.description,
            steps = scenario.steps.len(),
            "Running scenario"
        );

        for step in &scenario.steps {
            self.execute_step(step).await?;
            self.metrics.steps += 1;
        }

        Ok(())
    }

    /// Shut the desk down and return the run metrics.
    pub fn finish(mut self) -> SimulationMetrics {
        self.metrics.desk = self.desk.metrics();
        self.metrics.final_snapshot = Some(self.desk.snapshot());
        self.desk.shutdown();
        self.metrics
    }

    /// Execute a single scenario step.
    async fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::SelectSell { symbol } => {
                info!(symbol = ?symbol, "Selecting sell currency");
                self.desk.select_sell(symbol.as_deref().map(Symbol::new))?;
            }
            ScenarioStep::SelectBuy { symbol } => {
                info!(symbol = ?symbol, "Selecting buy currency");
                self.desk.select_buy(symbol.as_deref().map(Symbol::new))?;
            }
            ScenarioStep::Type { text } => {
                for key in text.chars() {
                    let mut raw = self.desk.snapshot().intent.sell_amount;
                    raw.push(key);
                    let stored = self.desk.edit_sell_amount(&raw)?;
                    self.metrics.record_keystroke(stored == raw);
                }
                info!(amount = %self.desk.snapshot().intent.sell_amount, "Typed sell amount");
            }
            ScenarioStep::ClearAmount => {
                self.desk.edit_sell_amount("")?;
            }
            ScenarioStep::Wait { millis } => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            ScenarioStep::SwapPair => {
                let swapped = self.desk.swap_pair().await?;
                info!(swapped, "Pair swap requested");
            }
            ScenarioStep::Submit => match self.desk.submit().await {
                Ok(receipt) => {
                    info!(
                        receipt = %receipt.id,
                        sell = %receipt.sell,
                        buy = %receipt.buy,
                        sell_amount = %receipt.sell_amount,
                        buy_amount = %receipt.buy_amount,
                        "Swap executed"
                    );
                    self.metrics.record_submit(true);
                }
                Err(err) => {
                    warn!(code = err.error_code(), message = %err.user_message(), "Swap not executed");
                    self.metrics.record_submit(false);
                }
            },
            ScenarioStep::Assert { condition } => {
                let failure = check(condition, &self.desk.snapshot());
                match &failure {
                    None => info!(condition = ?condition, "Assertion held"),
                    Some(reason) => warn!(condition = ?condition, reason = %reason, "Assertion failed"),
                }
                self.metrics.record_assertion(failure);
            }
        }

        Ok(())
    }
}

/// Evaluate a condition, describing the mismatch if it does not hold.
fn check(condition: &AssertCondition, snapshot: &DeskSnapshot) -> Option<String> {
    let intent = &snapshot.intent;

    match condition {
        AssertCondition::SellAmountEquals { amount } if &intent.sell_amount != amount => Some(
            format!("sell amount is {:?}, expected {:?}", intent.sell_amount, amount),
        ),
        AssertCondition::BuyAmountEquals { amount } if &intent.buy_amount != amount => Some(
            format!("buy amount is {:?}, expected {:?}", intent.buy_amount, amount),
        ),
        AssertCondition::BuyAmountPresent if intent.buy_amount.is_empty() => {
            Some("buy amount is empty".to_string())
        }
        AssertCondition::StateIs { state } if !matches_state(*state, &snapshot.state) => {
            Some(format!("state is {}, expected {:?}", snapshot.state, state))
        }
        AssertCondition::BannerEquals { text } if snapshot.banner() != text.as_deref() => Some(
            format!("banner is {:?}, expected {:?}", snapshot.banner(), text),
        ),
        AssertCondition::CanSubmit { expected } if snapshot.can_submit() != *expected => Some(
            format!("submit enabled is {}, expected {}", snapshot.can_submit(), expected),
        ),
        _ => None,
    }
}

fn matches_state(expected: ExpectedState, actual: &SwapState) -> bool {
    matches!(
        (expected, actual),
        (ExpectedState::Idle, SwapState::Idle)
            | (ExpectedState::Submitting, SwapState::Submitting)
            | (ExpectedState::Succeeded, SwapState::Succeeded)
            | (ExpectedState::Failed, SwapState::Failed(_))
    )
}
