//! Swap submission state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──success──▶ Succeeded ──reset delay──▶ Idle
//!                       │
//!                       └──failure/fault──▶ Failed ──submit──▶ Submitting
//! ```
//!
//! Validation failures go straight to `Failed` without entering `Submitting`.

use std::sync::{Arc, Weak};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swapdesk_common::{
    now, SwapError, SwapIntent, SwapResult, SwapState, Symbol, Timestamp, ValidationError,
    MSG_TRANSACTION_FAILED, MSG_UNEXPECTED_ERROR,
};
use swapdesk_fx::parse_amount;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::context::{DeskContext, DeskShared};
use crate::events::DeskEvent;
use crate::executor::ExecutionOutcome;
use crate::recompute;

/// Record of a swap the executor accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub id: Uuid,
    pub sell: Symbol,
    pub buy: Symbol,
    pub sell_amount: String,
    pub buy_amount: String,
    pub executed_at: Timestamp,
}

/// A swap that passed the submit preconditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSwap {
    pub sell: Symbol,
    pub buy: Symbol,
    pub amount: Decimal,
}

/// Check the submit preconditions.
pub fn validate(intent: &SwapIntent) -> Result<ValidatedSwap, ValidationError> {
    let (Some(sell), Some(buy)) = (&intent.sell_symbol, &intent.buy_symbol) else {
        return Err(ValidationError::MissingFields);
    };
    if intent.sell_amount.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    let amount = parse_amount(&intent.sell_amount).ok_or(ValidationError::InvalidNumber)?;
    Ok(ValidatedSwap {
        sell: sell.clone(),
        buy: buy.clone(),
        amount,
    })
}

/// Moves a dropped submit out of `Submitting`.
struct SubmittingGuard {
    shared: Arc<DeskShared>,
    armed: bool,
}

impl SubmittingGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut ctx = self.shared.ctx.lock();
        if ctx.state.is_submitting() {
            warn!("Submit abandoned mid-flight");
            self.shared.metrics.failed();
            let _ = ctx.transition(SwapState::Failed(MSG_UNEXPECTED_ERROR.to_string()), &self.shared);
        }
    }
}

/// Run one submit attempt to completion.
#[instrument(skip(shared))]
pub(crate) async fn submit(shared: &Arc<DeskShared>) -> SwapResult<SwapReceipt> {
    let (intent, swap) = {
        let mut ctx = shared.ctx.lock();
        ctx.ensure_open()?;

        if ctx.state.is_submitting() {
            return Err(SwapError::Busy("a swap is already submitting"));
        }
        if ctx.pair_swapping {
            return Err(SwapError::Busy("a pair swap is pending"));
        }

        // Any new attempt supersedes a pending success reset.
        ctx.reset.cancel();

        match validate(&ctx.intent) {
            Ok(swap) => {
                ctx.transition(SwapState::Submitting, shared)?;
                (ctx.intent.clone(), swap)
            }
            Err(err) => {
                shared.metrics.validation_rejected();
                warn!(reason = %err, "Submit rejected");
                ctx.transition(SwapState::Failed(err.to_string()), shared)?;
                return Err(err.into());
            }
        }
    };

    shared.metrics.submitted();
    info!(
        sell = %swap.sell,
        buy = %swap.buy,
        amount = %swap.amount,
        executor = shared.executor.name(),
        "Swap submitted"
    );

    let mut guard = SubmittingGuard {
        shared: shared.clone(),
        armed: true,
    };
    let outcome = shared.executor.execute(&intent).await;
    guard.disarm();

    let mut ctx = shared.ctx.lock();
    match outcome {
        Ok(ExecutionOutcome::Success) => {
            shared.metrics.succeeded();
            ctx.transition(SwapState::Succeeded, shared)?;
            if !ctx.closed {
                arm_reset(shared, &mut ctx);
            }

            let receipt = SwapReceipt {
                id: Uuid::now_v7(),
                sell: swap.sell,
                buy: swap.buy,
                sell_amount: intent.sell_amount,
                buy_amount: intent.buy_amount,
                executed_at: now(),
            };
            info!(receipt = %receipt.id, "Swap settled");
            Ok(receipt)
        }
        Ok(ExecutionOutcome::Failure) => {
            shared.metrics.failed();
            warn!("Swap execution failed");
            ctx.transition(SwapState::Failed(MSG_TRANSACTION_FAILED.to_string()), shared)?;
            Err(SwapError::ExecutionFailed)
        }
        Err(err) => {
            shared.metrics.failed();
            warn!(error = %err, "Swap execution fault");
            ctx.transition(SwapState::Failed(MSG_UNEXPECTED_ERROR.to_string()), shared)?;
            Err(SwapError::ExecutionFault(err.to_string()))
        }
    }
}

fn arm_reset(shared: &Arc<DeskShared>, ctx: &mut DeskContext) {
    let weak: Weak<DeskShared> = Arc::downgrade(shared);
    ctx.reset.arm(shared.config.success_reset_delay, move |generation| {
        if let Some(shared) = weak.upgrade() {
            reset(&shared, generation);
        }
    });
}

fn reset(shared: &DeskShared, generation: u64) {
    let mut ctx = shared.ctx.lock();
    if ctx.closed || !ctx.reset.complete(generation) {
        return;
    }

    ctx.intent.clear_amounts();
    recompute::cancel(shared, &mut ctx);
    shared.emit(DeskEvent::AmountsCleared);

    if let Err(err) = ctx.transition(SwapState::Idle, shared) {
        warn!(error = %err, "Success reset skipped");
        return;
    }
    debug!("Form reset after successful swap");
}
