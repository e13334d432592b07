//! Session configuration.

use std::time::Duration;

use swapdesk_common::{constants, millis};

/// Simulated swap execution configuration.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Time the simulated executor takes to answer.
    pub latency: Duration,
    /// Probability of a successful outcome, in `[0, 1]`.
    pub success_rate: f64,
    /// Seed for reproducible outcomes.
    pub seed: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            latency: constants::SIMULATED_EXECUTION_LATENCY,
            success_rate: constants::SIMULATED_SUCCESS_RATE,
            seed: None,
        }
    }
}

/// Swap session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before the buy amount is recomputed.
    pub debounce_window: Duration,
    /// How long a successful swap is shown before the form resets.
    pub success_reset_delay: Duration,
    /// Busy period of a pair swap.
    pub pair_swap_latency: Duration,
    /// Buffer size of the session event channel.
    pub event_capacity: usize,
    /// Simulated executor configuration.
    pub execution: ExecutionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_window: constants::DEBOUNCE_WINDOW,
            success_reset_delay: constants::SUCCESS_RESET_DELAY,
            pair_swap_latency: constants::PAIR_SWAP_LATENCY,
            event_capacity: 256,
            execution: ExecutionConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay the defaults with `SWAPDESK_*` values read through `lookup`.
    ///
    /// Values that are missing or fail to parse keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let mut config = Self::default();

        if let Some(ms) = read("SWAPDESK_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            config.debounce_window = millis(ms);
        }

        if let Some(ms) = read("SWAPDESK_RESET_DELAY_MS").and_then(|v| v.parse().ok()) {
            config.success_reset_delay = millis(ms);
        }

        if let Some(ms) = read("SWAPDESK_PAIR_SWAP_MS").and_then(|v| v.parse().ok()) {
            config.pair_swap_latency = millis(ms);
        }

        if let Some(ms) = read("SWAPDESK_EXECUTION_LATENCY_MS").and_then(|v| v.parse().ok()) {
            config.execution.latency = millis(ms);
        }

        if let Some(rate) = read("SWAPDESK_SUCCESS_RATE").and_then(|v| v.parse().ok()) {
            config.execution.success_rate = rate;
        }

        if let Some(seed) = read("SWAPDESK_SEED").and_then(|v| v.parse().ok()) {
            config.execution.seed = Some(seed);
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_window.is_zero() {
            return Err("Debounce window cannot be zero".to_string());
        }

        if self.event_capacity == 0 {
            return Err("Event capacity cannot be zero".to_string());
        }

        let rate = self.execution.success_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!("Success rate {} must be within [0, 1]", rate));
        }

        Ok(())
    }
}
