//! Simulation metrics.

use serde::Serialize;
use swapdesk_fx::IngestReport;
use swapdesk_session::{DeskSnapshot, MetricsSnapshot};

/// Outcome of one scenario run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Steps executed.
    pub steps: u64,
    /// Keystrokes fed to the sell field.
    pub keystrokes: u64,
    /// Keystrokes the sanitizer rejected.
    pub rejected_keystrokes: u64,
    /// Submits that returned a receipt.
    pub swaps_succeeded: u64,
    /// Submits that returned an error.
    pub swaps_failed: u64,
    /// Assertions that held.
    pub assertions_passed: u64,
    /// Descriptions of assertions that did not hold.
    pub assertion_failures: Vec<String>,
    /// Catalog ingestion summary.
    pub ingest: Option<IngestReport>,
    /// Desk counters at the end of the run.
    pub desk: MetricsSnapshot,
    /// Form state at the end of the run.
    pub final_snapshot: Option<DeskSnapshot>,
}

impl SimulationMetrics {
    /// Create metrics for a scenario.
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            ..Default::default()
        }
    }

    /// Record a keystroke and whether the sanitizer took it.
    pub fn record_keystroke(&mut self, accepted: bool) {
        self.keystrokes += 1;
        if !accepted {
            self.rejected_keystrokes += 1;
        }
    }

    /// Record a submit outcome.
    pub fn record_submit(&mut self, succeeded: bool) {
        if succeeded {
            self.swaps_succeeded += 1;
        } else {
            self.swaps_failed += 1;
        }
    }

    /// Record an assertion outcome.
    pub fn record_assertion(&mut self, failure: Option<String>) {
        match failure {
            None => self.assertions_passed += 1,
            Some(reason) => self.assertion_failures.push(reason),
        }
    }

    /// Check if every assertion held.
    pub fn passed(&self) -> bool {
        self.assertion_failures.is_empty()
    }

    /// Share of keystrokes the sanitizer accepted.
    pub fn keystroke_acceptance(&self) -> f64 {
        if self.keystrokes == 0 {
            return 0.0;
        }

        (self.keystrokes - self.rejected_keystrokes) as f64 / self.keystrokes as f64
    }
}
