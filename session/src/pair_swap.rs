//! Exchanging the sell and buy sides.

use std::sync::Arc;

use swapdesk_common::{SwapError, SwapResult};
use tracing::{debug, info, instrument};

use crate::context::DeskShared;
use crate::events::DeskEvent;
use crate::recompute;

/// Clears `pair_swapping` if a pair swap is dropped while waiting.
struct PairSwapGuard {
    shared: Arc<DeskShared>,
    armed: bool,
}

impl Drop for PairSwapGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut ctx = self.shared.ctx.lock();
        ctx.pair_swapping = false;
        ctx.sync_loading(&self.shared);
        debug!("Pair swap abandoned");
    }
}

/// Swap the two sides after the pair-swap latency.
///
/// Returns `Ok(false)` without waiting when a side is unselected.
#[instrument(skip(shared))]
pub(crate) async fn swap_pair(shared: &Arc<DeskShared>) -> SwapResult<bool> {
    {
        let mut ctx = shared.ctx.lock();
        ctx.ensure_inputs_unlocked()?;

        if ctx.pair_swapping {
            return Err(SwapError::Busy("a pair swap is already pending"));
        }
        if !ctx.intent.has_pair() {
            debug!("Pair swap skipped, a side is unselected");
            return Ok(false);
        }

        ctx.pair_swapping = true;
        ctx.sync_loading(shared);
    }

    let mut guard = PairSwapGuard {
        shared: shared.clone(),
        armed: true,
    };
    tokio::time::sleep(shared.config.pair_swap_latency).await;
    guard.armed = false;

    let mut ctx = shared.ctx.lock();
    ctx.pair_swapping = false;

    if ctx.closed {
        return Err(SwapError::Closed);
    }
    if !ctx.intent.has_pair() {
        ctx.sync_loading(shared);
        return Ok(false);
    }

    ctx.intent = ctx.intent.swapped();
    shared.metrics.pair_swapped();
    shared.emit(DeskEvent::PairSwapped {
        sell: ctx.intent.sell_symbol.clone(),
        buy: ctx.intent.buy_symbol.clone(),
    });
    info!(
        sell = ?ctx.intent.sell_symbol,
        buy = ?ctx.intent.buy_symbol,
        sell_amount = %ctx.intent.sell_amount,
        "Pair swapped"
    );

    recompute::restart(shared, &mut ctx);
    Ok(true)
}
