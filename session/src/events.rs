//! Session events published to observers.

use serde::Serialize;
use swapdesk_common::{SwapState, Symbol};

/// Something observable changed in the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeskEvent {
    /// A new catalog replaced the old one.
    CatalogRefreshed { quotes: usize },
    /// The swap state moved.
    StateChanged { from: SwapState, to: SwapState },
    /// The converter produced a new buy amount (`""` when unavailable).
    BuyAmountUpdated { buy_amount: String },
    /// The price-loading indicator toggled.
    PriceLoading { loading: bool },
    /// Sell and buy selections were exchanged.
    PairSwapped {
        sell: Option<Symbol>,
        buy: Option<Symbol>,
    },
    /// Amounts were cleared after a successful swap.
    AmountsCleared,
    /// The session was torn down.
    Closed,
}
