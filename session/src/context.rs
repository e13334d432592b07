//! Session context shared by the desk components.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use swapdesk_common::{SwapError, SwapIntent, SwapResult, SwapState};
use swapdesk_fx::PriceBook;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::SessionConfig;
use crate::events::DeskEvent;
use crate::executor::SwapExecutor;
use crate::metrics::DeskMetrics;
use crate::timer::SingleFlightTimer;

/// Everything a desk component needs, behind one `Arc`.
///
/// Scheduled callbacks hold a `Weak` to this, so they never keep a
/// torn-down session alive.
pub(crate) struct DeskShared {
    pub config: SessionConfig,
    pub prices: PriceBook,
    pub executor: Arc<dyn SwapExecutor>,
    pub ctx: Mutex<DeskContext>,
    pub metrics: DeskMetrics,
    pub events: broadcast::Sender<DeskEvent>,
}

impl DeskShared {
    pub fn new(
        config: SessionConfig,
        prices: PriceBook,
        executor: Arc<dyn SwapExecutor>,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            config,
            prices,
            executor,
            ctx: Mutex::new(DeskContext::new(runtime)),
            metrics: DeskMetrics::new(),
            events,
        }
    }

    /// Publish an event; having no subscribers is fine.
    pub fn emit(&self, event: DeskEvent) {
        let _ = self.events.send(event);
    }
}

/// Mutable session state. Only touched under the `DeskShared::ctx` lock,
/// which is never held across an `.await`.
pub(crate) struct DeskContext {
    pub intent: SwapIntent,
    pub state: SwapState,
    pub pair_swapping: bool,
    pub closed: bool,
    pub recompute: SingleFlightTimer,
    pub reset: SingleFlightTimer,
    loading_reported: bool,
}

impl DeskContext {
    fn new(runtime: Handle) -> Self {
        Self {
            intent: SwapIntent::default(),
            state: SwapState::Idle,
            pair_swapping: false,
            closed: false,
            recompute: SingleFlightTimer::new("recompute", runtime.clone()),
            reset: SingleFlightTimer::new("success-reset", runtime),
            loading_reported: false,
        }
    }

    pub fn ensure_open(&self) -> SwapResult<()> {
        if self.closed {
            return Err(SwapError::Closed);
        }
        Ok(())
    }

    /// Inputs are frozen while a swap is executing.
    pub fn ensure_inputs_unlocked(&self) -> SwapResult<()> {
        self.ensure_open()?;
        if self.state.is_submitting() {
            return Err(SwapError::Busy("inputs are locked while submitting"));
        }
        Ok(())
    }

    /// Price-loading indicator: a recompute or pair swap is pending.
    pub fn price_loading(&self) -> bool {
        self.recompute.is_pending() || self.pair_swapping
    }

    /// Publish the loading indicator if it changed since last published.
    pub fn sync_loading(&mut self, shared: &DeskShared) {
        let loading = self.price_loading();
        if loading != self.loading_reported {
            self.loading_reported = loading;
            shared.emit(DeskEvent::PriceLoading { loading });
        }
    }

    /// Move to `next`, refusing transitions the state machine does not allow.
    pub fn transition(&mut self, next: SwapState, shared: &DeskShared) -> SwapResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(SwapError::InvalidTransition {
                from: self.state.clone(),
                to: next,
            });
        }

        let from = std::mem::replace(&mut self.state, next.clone());
        debug!(from = %from, to = %next, "Swap state changed");
        shared.emit(DeskEvent::StateChanged { from, to: next });
        Ok(())
    }

    pub fn snapshot(&self) -> DeskSnapshot {
        DeskSnapshot {
            intent: self.intent.clone(),
            state: self.state.clone(),
            price_loading: self.price_loading(),
            pair_swapping: self.pair_swapping,
            closed: self.closed,
        }
    }
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeskSnapshot {
    pub intent: SwapIntent,
    pub state: SwapState,
    pub price_loading: bool,
    pub pair_swapping: bool,
    pub closed: bool,
}

impl DeskSnapshot {
    /// Whether the submit trigger is enabled.
    pub fn can_submit(&self) -> bool {
        !self.closed && !self.state.is_submitting() && !self.pair_swapping && self.intent.is_complete()
    }

    /// Label for the submit trigger.
    pub fn submit_label(&self) -> &'static str {
        if self.state.is_submitting() {
            "Swapping..."
        } else if !self.intent.has_pair() {
            "Select tokens"
        } else if self.intent.sell_amount.is_empty() {
            "Enter amount"
        } else {
            "Get started"
        }
    }

    /// Whether the swap-direction trigger is enabled.
    pub fn can_swap_pair(&self) -> bool {
        !self.closed && !self.state.is_submitting() && !self.pair_swapping && self.intent.has_pair()
    }

    /// Success or error banner, if one is showing.
    pub fn banner(&self) -> Option<&str> {
        self.state.banner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapdesk_common::Symbol;

    fn snapshot(intent: SwapIntent, state: SwapState) -> DeskSnapshot {
        DeskSnapshot {
            intent,
            state,
            price_loading: false,
            pair_swapping: false,
            closed: false,
        }
    }

    #[test]
    fn test_submit_affordance() {
        let empty = snapshot(SwapIntent::default(), SwapState::Idle);
        assert!(!empty.can_submit());
        assert_eq!(empty.submit_label(), "Select tokens");

        let mut intent = SwapIntent::new(Symbol::new("USD"), Symbol::new("ETH"), "");
        let no_amount = snapshot(intent.clone(), SwapState::Idle);
        assert!(!no_amount.can_submit());
        assert_eq!(no_amount.submit_label(), "Enter amount");

        intent.sell_amount = "10".to_string();
        let ready = snapshot(intent.clone(), SwapState::Failed("x".into()));
        assert!(ready.can_submit());
        assert_eq!(ready.submit_label(), "Get started");
        assert_eq!(ready.banner(), Some("x"));

        let busy = snapshot(intent, SwapState::Submitting);
        assert!(!busy.can_submit());
        assert!(!busy.can_swap_pair());
        assert_eq!(busy.submit_label(), "Swapping...");
    }
}
