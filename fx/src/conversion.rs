//! Rate derivation and sell-to-buy amount conversion.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use swapdesk_common::constants::AMOUNT_DECIMALS;
use swapdesk_common::Symbol;

use crate::amount::parse_amount;
use crate::catalog::Catalog;

/// Cross rate between two catalog quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Currency being sold.
    pub sell: Symbol,
    /// Currency being bought.
    pub buy: Symbol,
    /// Units of `buy` received per unit of `sell`.
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Derive the rate from two quotes in the catalog.
    pub fn between(sell: &Symbol, buy: &Symbol, catalog: &Catalog) -> Option<Self> {
        let sell_quote = catalog.get(sell.code())?;
        let buy_quote = catalog.get(buy.code())?;
        let rate = sell_quote.unit_price.checked_div(buy_quote.unit_price)?;

        Some(Self {
            sell: sell.clone(),
            buy: buy.clone(),
            rate,
        })
    }

    /// Apply the rate to a sell amount.
    pub fn apply(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.rate)
    }

    /// Get the inverse rate.
    pub fn inverse(&self) -> Option<Self> {
        Some(Self {
            sell: self.buy.clone(),
            buy: self.sell.clone(),
            rate: Decimal::ONE.checked_div(self.rate)?,
        })
    }
}

/// Compute the buy amount for a sell amount.
///
/// Returns `None` when a symbol is unset or missing from the catalog, or when
/// the amount is empty or non-numeric. The result always carries exactly six
/// fractional digits.
pub fn convert(
    sell: Option<&Symbol>,
    buy: Option<&Symbol>,
    sell_amount: &str,
    catalog: &Catalog,
) -> Option<String> {
    let (sell, buy) = (sell?, buy?);
    if sell_amount.is_empty() {
        return None;
    }

    let amount = parse_amount(sell_amount)?;
    let rate = ExchangeRate::between(sell, buy, catalog)?;
    let output = rate.apply(amount)?;

    Some(format_amount(output))
}

/// Format a decimal as fixed-point with six fractional digits.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_DECIMALS);
    rounded.to_string()
}
