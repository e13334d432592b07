//! The swap desk: one user's swap form.

use std::sync::Arc;

use swapdesk_common::{SwapError, SwapResult, Symbol};
use swapdesk_fx::{sanitize, Catalog, FxError, FxResult, IngestReport, PriceBook, PriceSource};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::context::{DeskContext, DeskShared, DeskSnapshot};
use crate::events::DeskEvent;
use crate::executor::{SimulatedExecutor, SwapExecutor};
use crate::metrics::MetricsSnapshot;
use crate::orchestrator::{self, SwapReceipt};
use crate::{pair_swap, recompute};

/// A swap session.
///
/// Owns the catalog, the intent and the swap state. Every pending timer is
/// aborted when the desk is shut down or dropped.
pub struct SwapDesk {
    shared: Arc<DeskShared>,
}

impl SwapDesk {
    /// Create a desk with an empty catalog.
    ///
    /// Must be called from within a tokio runtime; the desk schedules its
    /// timers on that runtime even when later driven from sync code.
    /// Outside a runtime this fails with [`SwapError::ConfigurationError`].
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn PriceSource>,
        executor: Arc<dyn SwapExecutor>,
    ) -> SwapResult<Self> {
        config.validate().map_err(SwapError::ConfigurationError)?;
        let runtime = Handle::try_current()
            .map_err(|e| SwapError::ConfigurationError(format!("no tokio runtime: {}", e)))?;

        info!(
            source = source.name(),
            executor = executor.name(),
            "Swap desk created"
        );

        Ok(Self {
            shared: Arc::new(DeskShared::new(
                config,
                PriceBook::new(source),
                executor,
                runtime,
            )),
        })
    }

    /// Create a desk backed by a [`SimulatedExecutor`] built from the config.
    pub fn simulated(config: SessionConfig, source: Arc<dyn PriceSource>) -> SwapResult<Self> {
        let executor = Arc::new(SimulatedExecutor::new(&config.execution));
        Self::new(config, source, executor)
    }

    /// Fetch prices and replace the catalog.
    ///
    /// A failed refresh keeps the previous catalog. A successful one
    /// recomputes the buy amount when both sides are selected. After
    /// shutdown the catalog is left untouched and [`FxError::Closed`] is
    /// returned.
    pub async fn load_prices(&self) -> FxResult<IngestReport> {
        if self.shared.ctx.lock().closed {
            return Err(FxError::Closed);
        }

        let report = match self.shared.prices.refresh().await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "Price refresh failed");
                return Err(err);
            }
        };

        let mut ctx = self.shared.ctx.lock();
        if ctx.closed {
            // Shut down while the refresh was in flight.
            return Err(FxError::Closed);
        }

        self.shared.emit(DeskEvent::CatalogRefreshed {
            quotes: report.accepted,
        });
        if ctx.intent.has_pair() {
            recompute::restart(&self.shared, &mut ctx);
        }

        Ok(report)
    }

    /// Current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.shared.prices.catalog()
    }

    /// Unit price of `symbol` for display next to a selector.
    pub fn display_price(&self, symbol: &str) -> Option<String> {
        self.shared.prices.catalog().display_price(symbol)
    }

    /// Select the currency to sell.
    pub fn select_sell(&self, symbol: Option<Symbol>) -> SwapResult<()> {
        self.edit(|ctx| {
            if ctx.intent.sell_symbol == symbol {
                return false;
            }
            ctx.intent.sell_symbol = symbol;
            true
        })
    }

    /// Select the currency to buy.
    pub fn select_buy(&self, symbol: Option<Symbol>) -> SwapResult<()> {
        self.edit(|ctx| {
            if ctx.intent.buy_symbol == symbol {
                return false;
            }
            ctx.intent.buy_symbol = symbol;
            true
        })
    }

    /// Apply a raw edit of the sell amount.
    ///
    /// Invalid edits are ignored. Returns the stored amount afterwards.
    pub fn edit_sell_amount(&self, raw: &str) -> SwapResult<String> {
        let mut stored = String::new();
        self.edit(|ctx| {
            let next = sanitize(raw, &ctx.intent.sell_amount);
            let changed = next != ctx.intent.sell_amount;
            if changed {
                ctx.intent.sell_amount = next;
            } else {
                debug!(raw, "Amount edit ignored");
            }
            stored = ctx.intent.sell_amount.clone();
            changed
        })?;
        Ok(stored)
    }

    /// Exchange the sell and buy sides.
    ///
    /// Returns `Ok(false)` when a side is unselected.
    pub async fn swap_pair(&self) -> SwapResult<bool> {
        pair_swap::swap_pair(&self.shared).await
    }

    /// Submit the current intent for execution.
    pub async fn submit(&self) -> SwapResult<SwapReceipt> {
        orchestrator::submit(&self.shared).await
    }

    /// Current view of the form.
    pub fn snapshot(&self) -> DeskSnapshot {
        self.shared.ctx.lock().snapshot()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.shared.events.subscribe()
    }

    /// Session counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Tear the session down. Later operations fail with [`SwapError::Closed`].
    pub fn shutdown(&self) {
        let mut ctx = self.shared.ctx.lock();
        if ctx.closed {
            return;
        }

        ctx.closed = true;
        ctx.reset.cancel();
        recompute::cancel(&self.shared, &mut ctx);
        self.shared.emit(DeskEvent::Closed);
        info!("Swap desk shut down");
    }

    /// Apply an input change; `apply` returns whether a recompute input changed.
    fn edit(&self, apply: impl FnOnce(&mut DeskContext) -> bool) -> SwapResult<()> {
        let mut ctx = self.shared.ctx.lock();
        ctx.ensure_inputs_unlocked()?;

        if apply(&mut *ctx) {
            recompute::restart(&self.shared, &mut ctx);
        }
        Ok(())
    }
}

impl Drop for SwapDesk {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use swapdesk_common::{
        SwapState, ValidationError, MSG_FILL_ALL_FIELDS, MSG_TRANSACTION_FAILED,
        MSG_UNEXPECTED_ERROR,
    };
    use swapdesk_fx::StaticPriceSource;

    use crate::executor::{ExecutionOutcome, ScriptedExecutor};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn prices() -> Arc<StaticPriceSource> {
        Arc::new(StaticPriceSource::from_pairs([
            ("USD", 1.0),
            ("ETH", 3000.0),
            ("BTC", 60000.0),
        ]))
    }

    async fn create_desk(executor: Arc<ScriptedExecutor>) -> SwapDesk {
        let desk = SwapDesk::new(SessionConfig::default(), prices(), executor).unwrap();
        desk.load_prices().await.unwrap();
        desk
    }

    async fn ready_desk(executor: Arc<ScriptedExecutor>, amount: &str) -> SwapDesk {
        let desk = create_desk(executor).await;
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();
        desk.edit_sell_amount(amount).unwrap();
        tokio::time::sleep(ms(600)).await;
        desk
    }

    fn state_changes(rx: &mut broadcast::Receiver<DeskEvent>) -> Vec<(SwapState, SwapState)> {
        let mut changes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let DeskEvent::StateChanged { from, to } = event {
                changes.push((from, to));
            }
        }
        changes
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_convert_once() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();

        desk.edit_sell_amount("1").unwrap();
        tokio::time::sleep(ms(100)).await;
        desk.edit_sell_amount("12").unwrap();
        tokio::time::sleep(ms(100)).await;
        desk.edit_sell_amount("123").unwrap();
        assert!(desk.snapshot().price_loading);

        tokio::time::sleep(ms(600)).await;

        let snapshot = desk.snapshot();
        assert!(!snapshot.price_loading);
        assert_eq!(snapshot.intent.buy_amount, "0.041000");
        assert_eq!(desk.metrics().conversions, 1);
        assert!(desk.metrics().debounce_restarts >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_edit_keeps_amount() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;

        assert_eq!(desk.edit_sell_amount("1.5").unwrap(), "1.5");
        assert_eq!(desk.edit_sell_amount("1.5.").unwrap(), "1.5");
        assert_eq!(desk.edit_sell_amount("1.1234567").unwrap(), "1.5");
        assert_eq!(desk.edit_sell_amount("1.5a").unwrap(), "1.5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_without_amount_never_submits() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();
        let mut rx = desk.subscribe();

        let result = desk.submit().await;

        assert_eq!(
            result,
            Err(SwapError::Validation(ValidationError::MissingFields))
        );
        assert_eq!(
            state_changes(&mut rx),
            vec![(
                SwapState::Idle,
                SwapState::Failed(MSG_FILL_ALL_FIELDS.to_string())
            )]
        );
        assert_eq!(desk.metrics().submits, 0);
        assert_eq!(desk.metrics().validation_rejections, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_swap_resets_form() {
        let executor = Arc::new(ScriptedExecutor::new(ms(2000)));
        executor.push(Ok(ExecutionOutcome::Success));
        let desk = ready_desk(executor, "3000").await;
        let mut rx = desk.subscribe();

        let receipt = desk.submit().await.unwrap();

        assert_eq!(receipt.sell, Symbol::new("USD"));
        assert_eq!(receipt.buy, Symbol::new("ETH"));
        assert_eq!(receipt.sell_amount, "3000");
        assert_eq!(receipt.buy_amount, "1.000000");

        let snapshot = desk.snapshot();
        assert_eq!(snapshot.state, SwapState::Succeeded);
        assert_eq!(snapshot.banner(), Some("Swap completed successfully!"));
        assert_eq!(snapshot.intent.sell_amount, "3000");

        tokio::time::sleep(ms(3100)).await;

        let snapshot = desk.snapshot();
        assert_eq!(snapshot.state, SwapState::Idle);
        assert_eq!(snapshot.intent.sell_amount, "");
        assert_eq!(snapshot.intent.buy_amount, "");
        assert_eq!(snapshot.intent.sell_symbol, Some(Symbol::new("USD")));
        assert_eq!(
            state_changes(&mut rx),
            vec![
                (SwapState::Idle, SwapState::Submitting),
                (SwapState::Submitting, SwapState::Succeeded),
                (SwapState::Succeeded, SwapState::Idle),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_swap_keeps_amounts() {
        let executor = Arc::new(ScriptedExecutor::new(ms(2000)));
        executor.push(Ok(ExecutionOutcome::Failure));
        let desk = ready_desk(executor.clone(), "3000").await;
        let mut rx = desk.subscribe();

        assert_eq!(desk.submit().await, Err(SwapError::ExecutionFailed));

        let snapshot = desk.snapshot();
        assert_eq!(
            snapshot.state,
            SwapState::Failed(MSG_TRANSACTION_FAILED.to_string())
        );
        assert_eq!(snapshot.intent.sell_amount, "3000");
        assert_eq!(snapshot.intent.buy_amount, "1.000000");
        assert!(snapshot.can_submit());
        assert_eq!(
            state_changes(&mut rx),
            vec![
                (SwapState::Idle, SwapState::Submitting),
                (
                    SwapState::Submitting,
                    SwapState::Failed(MSG_TRANSACTION_FAILED.to_string())
                ),
            ]
        );

        // Retry from Failed goes through.
        assert!(desk.submit().await.is_ok());
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execution_fault_is_reported_generically() {
        let executor = Arc::new(ScriptedExecutor::new(ms(2000)));
        executor.push(Err(SwapError::ExecutionFault("node offline".into())));
        let desk = ready_desk(executor, "10").await;

        let err = desk.submit().await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(err.user_message(), MSG_UNEXPECTED_ERROR);
        assert_eq!(
            desk.snapshot().state,
            SwapState::Failed(MSG_UNEXPECTED_ERROR.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_leaves_submitting() {
        let desk = ready_desk(Arc::new(ScriptedExecutor::new(ms(2000))), "10").await;

        let timed_out = tokio::time::timeout(ms(100), desk.submit()).await;

        assert!(timed_out.is_err());
        assert_eq!(
            desk.snapshot().state,
            SwapState::Failed(MSG_UNEXPECTED_ERROR.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_submit_is_busy() {
        let executor = Arc::new(ScriptedExecutor::new(ms(2000)));
        let desk = ready_desk(executor.clone(), "10").await;

        let (first, second) = tokio::join!(desk.submit(), async {
            tokio::task::yield_now().await;
            let locked = desk.edit_sell_amount("11");
            (locked, desk.swap_pair().await, desk.submit().await)
        });

        assert!(first.is_ok());
        let (locked, pair, second) = second;
        assert!(matches!(locked, Err(SwapError::Busy(_))));
        assert!(matches!(pair, Err(SwapError::Busy(_))));
        assert!(matches!(second, Err(SwapError::Busy(_))));
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_pair_moves_buy_amount_to_sell() {
        let desk = ready_desk(Arc::new(ScriptedExecutor::new(ms(2000))), "100").await;
        desk.shared.ctx.lock().intent.buy_amount = "0.0333".to_string();

        let pending = desk.swap_pair();
        tokio::pin!(pending);
        tokio::select! {
            _ = &mut pending => panic!("pair swap finished early"),
            _ = tokio::time::sleep(ms(100)) => {}
        }
        assert!(desk.snapshot().pair_swapping);
        assert!(desk.snapshot().price_loading);
        assert!(!desk.snapshot().can_swap_pair());

        assert_eq!(pending.await, Ok(true));

        let snapshot = desk.snapshot();
        assert!(!snapshot.pair_swapping);
        assert!(snapshot.price_loading);
        assert_eq!(snapshot.intent.sell_symbol, Some(Symbol::new("ETH")));
        assert_eq!(snapshot.intent.buy_symbol, Some(Symbol::new("USD")));
        assert_eq!(snapshot.intent.sell_amount, "0.0333");
        assert_eq!(snapshot.intent.buy_amount, "");

        tokio::time::sleep(ms(600)).await;
        assert_eq!(desk.snapshot().intent.buy_amount, "99.900000");
        assert_eq!(desk.metrics().pair_swaps, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_pair_rules() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;
        desk.select_sell(Some("USD".into())).unwrap();

        assert_eq!(desk.swap_pair().await, Ok(false));

        desk.select_buy(Some("BTC".into())).unwrap();
        let (first, second) = tokio::join!(desk.swap_pair(), async {
            tokio::task::yield_now().await;
            (desk.swap_pair().await, desk.submit().await)
        });

        assert_eq!(first, Ok(true));
        assert!(matches!(second.0, Err(SwapError::Busy(_))));
        assert!(matches!(second.1, Err(SwapError::Busy(_))));
        assert_eq!(desk.snapshot().intent.sell_symbol, Some(Symbol::new("BTC")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_refresh_recomputes() {
        let desk = SwapDesk::new(
            SessionConfig::default(),
            prices(),
            Arc::new(ScriptedExecutor::new(ms(2000))),
        )
        .unwrap();
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();
        desk.edit_sell_amount("3000").unwrap();

        tokio::time::sleep(ms(600)).await;
        assert_eq!(desk.snapshot().intent.buy_amount, "");

        let report = desk.load_prices().await.unwrap();
        assert_eq!(report.accepted, 3);
        assert_eq!(desk.display_price("ETH").as_deref(), Some("3000.00"));

        tokio::time::sleep(ms(600)).await;
        assert_eq!(desk.snapshot().intent.buy_amount, "1.000000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_work() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();
        desk.edit_sell_amount("5").unwrap();

        desk.shutdown();
        tokio::time::sleep(ms(1000)).await;

        assert_eq!(desk.metrics().conversions, 0);
        assert!(desk.snapshot().closed);
        assert!(!desk.snapshot().price_loading);
        assert_eq!(desk.edit_sell_amount("6"), Err(SwapError::Closed));
        assert_eq!(desk.submit().await, Err(SwapError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submit_supersedes_reset() {
        let desk = ready_desk(Arc::new(ScriptedExecutor::new(ms(2000))), "10").await;

        desk.submit().await.unwrap();
        tokio::time::sleep(ms(1000)).await;
        desk.submit().await.unwrap();

        // The first reset fell due while the second swap was executing.
        assert_eq!(desk.snapshot().intent.sell_amount, "10");
        assert_eq!(desk.snapshot().state, SwapState::Succeeded);

        tokio::time::sleep(ms(3100)).await;
        assert_eq!(desk.snapshot().state, SwapState::Idle);
    }

    #[tokio::test]
    async fn test_unavailable_prices_leave_catalog_empty() {
        let desk = SwapDesk::new(
            SessionConfig::default(),
            Arc::new(swapdesk_fx::provider::UnavailablePriceSource),
            Arc::new(ScriptedExecutor::new(ms(10))),
        )
        .unwrap();

        let err = desk.load_prices().await.unwrap_err();

        assert!(err.is_retryable());
        assert!(desk.catalog().is_empty());
        assert_eq!(desk.display_price("USD"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_shutdown_is_refused() {
        let desk = create_desk(Arc::new(ScriptedExecutor::new(ms(2000)))).await;
        let before = desk.catalog();
        let mut rx = desk.subscribe();

        desk.shutdown();
        let result = desk.load_prices().await;

        assert_eq!(result, Err(FxError::Closed));
        assert!(Arc::ptr_eq(&before, &desk.catalog()));
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, DeskEvent::CatalogRefreshed { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_amount_edit_keeps_submittable_amount() {
        let desk = ready_desk(Arc::new(ScriptedExecutor::new(ms(2000))), "3000").await;

        let stored = desk.edit_sell_amount(&"1".repeat(30)).unwrap();
        tokio::time::sleep(ms(600)).await;

        assert_eq!(stored, "3000");
        assert_eq!(desk.snapshot().intent.buy_amount, "1.000000");
        assert!(desk.submit().await.is_ok());
    }

    #[test]
    fn test_new_requires_runtime() {
        let result = SwapDesk::new(
            SessionConfig::default(),
            prices(),
            Arc::new(ScriptedExecutor::new(ms(10))),
        );

        assert!(matches!(result, Err(SwapError::ConfigurationError(_))));
    }

    #[test]
    fn test_sync_edits_schedule_on_captured_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let desk = {
            let _entered = runtime.enter();
            SwapDesk::new(
                SessionConfig::default(),
                prices(),
                Arc::new(ScriptedExecutor::new(ms(10))),
            )
            .unwrap()
        };
        runtime.block_on(desk.load_prices()).unwrap();

        // Outside the runtime context from here on.
        desk.select_sell(Some("USD".into())).unwrap();
        desk.select_buy(Some("ETH".into())).unwrap();
        desk.edit_sell_amount("3000").unwrap();
        assert!(desk.snapshot().price_loading);

        runtime.block_on(async { tokio::time::sleep(ms(600)).await });
        assert_eq!(desk.snapshot().intent.buy_amount, "1.000000");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SessionConfig::default();
        config.execution.success_rate = 2.0;

        let result = SwapDesk::simulated(config, prices());

        assert!(matches!(result, Err(SwapError::ConfigurationError(_))));
    }
}
