//! Timing constants and time helpers for the swap session.

use chrono::{DateTime, Utc};

/// Reference delays, in milliseconds.
pub mod constants {
    use std::time::Duration;

    /// Quiet period before a recompute fires (500ms).
    pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

    /// How long the success state lingers before the form resets (3s).
    pub const SUCCESS_RESET_DELAY: Duration = Duration::from_millis(3000);

    /// Busy period of a pair swap (300ms).
    pub const PAIR_SWAP_LATENCY: Duration = Duration::from_millis(300);

    /// Latency of the simulated executor (2s).
    pub const SIMULATED_EXECUTION_LATENCY: Duration = Duration::from_millis(2000);

    /// Success probability of the simulated executor.
    pub const SIMULATED_SUCCESS_RATE: f64 = 0.9;

    /// Fractional digits kept in a sell amount and produced by the converter.
    pub const AMOUNT_DECIMALS: u32 = 6;

    /// Integer digits allowed in a sell amount. With the fractional digits
    /// this stays within the 28 significant digits a `Decimal` holds.
    pub const AMOUNT_INTEGER_DIGITS: u32 = 22;

    /// Fractional digits shown for a unit price.
    pub const PRICE_DISPLAY_DECIMALS: u32 = 2;
}

/// A UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a millisecond count, as read from configuration, into a duration.
pub fn millis(ms: u64) -> std::time::Duration {
    std::time::Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_delays() {
        assert_eq!(constants::DEBOUNCE_WINDOW, millis(500));
        assert_eq!(constants::SUCCESS_RESET_DELAY, millis(3000));
        assert!(constants::PAIR_SWAP_LATENCY < constants::DEBOUNCE_WINDOW);
    }
}
