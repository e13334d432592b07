//! The user's pending swap: selections plus amounts.

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Current selections and amounts of the swap form.
///
/// Amounts are decimal strings exactly as displayed. `buy_amount` is derived
/// by the converter and never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwapIntent {
    /// Currency being sold.
    pub sell_symbol: Option<Symbol>,
    /// Currency being bought.
    pub buy_symbol: Option<Symbol>,
    /// Sanitized sell amount, `""` when unset.
    pub sell_amount: String,
    /// Derived buy amount, `""` when unknown.
    pub buy_amount: String,
}

impl SwapIntent {
    /// Create an intent with both selections and a sell amount.
    pub fn new(sell: Symbol, buy: Symbol, sell_amount: impl Into<String>) -> Self {
        Self {
            sell_symbol: Some(sell),
            buy_symbol: Some(buy),
            sell_amount: sell_amount.into(),
            buy_amount: String::new(),
        }
    }

    /// Check if both currencies are selected.
    pub fn has_pair(&self) -> bool {
        self.sell_symbol.is_some() && self.buy_symbol.is_some()
    }

    /// Check if both currencies and a sell amount are present.
    pub fn is_complete(&self) -> bool {
        self.has_pair() && !self.sell_amount.is_empty()
    }

    /// Reverse the direction of the swap.
    ///
    /// The previous buy amount becomes the new sell amount and the new buy
    /// amount is left blank until it is recomputed.
    pub fn swapped(&self) -> Self {
        Self {
            sell_symbol: self.buy_symbol.clone(),
            buy_symbol: self.sell_symbol.clone(),
            sell_amount: self.buy_amount.clone(),
            buy_amount: String::new(),
        }
    }

    /// Clear both amounts, keeping the selections.
    pub fn clear_amounts(&mut self) {
        self.sell_amount.clear();
        self.buy_amount.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapped_moves_buy_amount_to_sell() {
        let intent = SwapIntent {
            sell_symbol: Some(Symbol::new("USD")),
            buy_symbol: Some(Symbol::new("ETH")),
            sell_amount: "100".to_string(),
            buy_amount: "0.0333".to_string(),
        };

        let swapped = intent.swapped();

        assert_eq!(swapped.sell_symbol, Some(Symbol::new("ETH")));
        assert_eq!(swapped.buy_symbol, Some(Symbol::new("USD")));
        assert_eq!(swapped.sell_amount, "0.0333");
        assert_eq!(swapped.buy_amount, "");
    }

    #[test]
    fn test_completeness() {
        let mut intent = SwapIntent::default();
        assert!(!intent.has_pair());

        intent.sell_symbol = Some(Symbol::new("USD"));
        intent.buy_symbol = Some(Symbol::new("ETH"));
        assert!(intent.has_pair());
        assert!(!intent.is_complete());

        intent.sell_amount = "1".to_string();
        intent.buy_amount = "0.000333".to_string();
        assert!(intent.is_complete());

        intent.clear_amounts();
        assert!(intent.sell_amount.is_empty());
        assert!(intent.buy_amount.is_empty());
        assert!(intent.has_pair());
    }
}
