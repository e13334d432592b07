//! Debounced recompute of the buy amount.

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::context::{DeskContext, DeskShared};
use crate::events::DeskEvent;

/// (Re)start the debounce window after a selection or amount change.
pub(crate) fn restart(shared: &Arc<DeskShared>, ctx: &mut DeskContext) {
    let weak: Weak<DeskShared> = Arc::downgrade(shared);

    let superseded = ctx.recompute.arm(shared.config.debounce_window, move |generation| {
        if let Some(shared) = weak.upgrade() {
            fire(&shared, generation);
        }
    });

    if superseded {
        shared.metrics.debounce_restarted();
        debug!(generation = ctx.recompute.generation(), "Debounce restarted");
    }

    ctx.sync_loading(shared);
}

/// Drop any pending recompute.
pub(crate) fn cancel(shared: &DeskShared, ctx: &mut DeskContext) {
    if ctx.recompute.cancel() {
        debug!("Pending recompute cancelled");
    }
    ctx.sync_loading(shared);
}

fn fire(shared: &DeskShared, generation: u64) {
    let mut ctx = shared.ctx.lock();

    if ctx.closed || !ctx.recompute.complete(generation) {
        debug!(generation, "Stale recompute ignored");
        return;
    }

    let buy_amount = shared
        .prices
        .convert(
            ctx.intent.sell_symbol.as_ref(),
            ctx.intent.buy_symbol.as_ref(),
            &ctx.intent.sell_amount,
        )
        .unwrap_or_default();
    shared.metrics.conversion();

    debug!(
        sell_amount = %ctx.intent.sell_amount,
        buy_amount = %buy_amount,
        "Buy amount recomputed"
    );

    ctx.intent.buy_amount = buy_amount.clone();
    shared.emit(DeskEvent::BuyAmountUpdated { buy_amount });
    ctx.sync_loading(shared);
}
