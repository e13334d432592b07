//! Swap execution collaborators.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use swapdesk_common::{SwapIntent, SwapResult};
use tracing::debug;

use crate::config::ExecutionConfig;

/// Result reported by an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    Success,
    Failure,
}

/// Trait for executing a swap.
///
/// An `Err` is treated as an unexpected fault; `Ok(Failure)` as a clean
/// rejection. Both leave the swap retryable.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    /// Get the executor name.
    fn name(&self) -> &str;

    /// Execute the swap described by `intent`.
    async fn execute(&self, intent: &SwapIntent) -> SwapResult<ExecutionOutcome>;
}

/// Executor that answers after a fixed latency with a random outcome.
pub struct SimulatedExecutor {
    latency: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedExecutor {
    /// Create a simulated executor.
    pub fn new(config: &ExecutionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let success_rate = if config.success_rate.is_nan() {
            0.0
        } else {
            config.success_rate.clamp(0.0, 1.0)
        };

        Self {
            latency: config.latency,
            success_rate,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> ExecutionOutcome {
        if self.rng.lock().gen_bool(self.success_rate) {
            ExecutionOutcome::Success
        } else {
            ExecutionOutcome::Failure
        }
    }
}

#[async_trait]
impl SwapExecutor for SimulatedExecutor {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn execute(&self, intent: &SwapIntent) -> SwapResult<ExecutionOutcome> {
        tokio::time::sleep(self.latency).await;
        let outcome = self.roll();

        debug!(
            sell = ?intent.sell_symbol,
            buy = ?intent.buy_symbol,
            amount = %intent.sell_amount,
            outcome = ?outcome,
            "Simulated execution finished"
        );

        Ok(outcome)
    }
}

/// Executor that replays queued outcomes, then succeeds.
#[cfg(any(test, feature = "test-utils"))]
pub struct ScriptedExecutor {
    latency: Duration,
    script: Mutex<std::collections::VecDeque<SwapResult<ExecutionOutcome>>>,
    calls: std::sync::atomic::AtomicU64,
}

#[cfg(any(test, feature = "test-utils"))]
impl ScriptedExecutor {
    /// Create an executor with the given latency.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            script: Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Queue the next outcome.
    pub fn push(&self, outcome: SwapResult<ExecutionOutcome>) -> &Self {
        self.script.lock().push_back(outcome);
        self
    }

    /// Number of executions so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl SwapExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, _intent: &SwapIntent) -> SwapResult<ExecutionOutcome> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Ok(ExecutionOutcome::Success))
    }
}
