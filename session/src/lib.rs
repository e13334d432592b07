//! SwapDesk Session
//!
//! The live swap form. A [`SwapDesk`] owns the price catalog, the user's
//! intent and the swap state, and drives them through three asynchronous
//! controllers: a debounced buy-amount recompute, the submit state machine
//! with its self-clearing success state, and the pair swap.

pub mod config;
pub mod desk;
pub mod events;
pub mod executor;
pub mod metrics;
pub mod orchestrator;
pub mod timer;

mod context;
mod pair_swap;
mod recompute;

pub use config::{ExecutionConfig, SessionConfig};
pub use context::DeskSnapshot;
pub use desk::SwapDesk;
pub use events::DeskEvent;
pub use executor::{ExecutionOutcome, SimulatedExecutor, SwapExecutor};
pub use metrics::{DeskMetrics, MetricsSnapshot};
pub use orchestrator::{validate, SwapReceipt, ValidatedSwap};

#[cfg(any(test, feature = "test-utils"))]
pub use executor::ScriptedExecutor;
