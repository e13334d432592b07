//! Currency symbols and unit-price quotes.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::QuoteError;
use crate::time::constants::PRICE_DISPLAY_DECIMALS;

/// Tradable currency symbol.
///
/// Symbols are case-sensitive (`bNEO` and `BNEO` are different assets), so the
/// code is stored exactly as the price feed reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, trimming surrounding whitespace.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(code.trim().to_string())
    }

    /// Get the symbol code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Check if the symbol is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A currency's unit price in the common reference unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    /// Currency symbol.
    pub symbol: Symbol,
    /// Price of one unit, always strictly positive.
    pub unit_price: Decimal,
}

impl CurrencyQuote {
    /// Create a quote, enforcing a non-empty symbol and a positive price.
    pub fn new(symbol: Symbol, unit_price: Decimal) -> Result<Self, QuoteError> {
        if symbol.is_empty() {
            return Err(QuoteError::MissingSymbol);
        }
        if unit_price <= Decimal::ZERO {
            return Err(QuoteError::NonPositivePrice {
                symbol,
                price: unit_price.to_string(),
            });
        }
        Ok(Self { symbol, unit_price })
    }

    /// Unit price rounded for display next to a selector.
    pub fn display_price(&self) -> String {
        let mut price = self.unit_price.round_dp(PRICE_DISPLAY_DECIMALS);
        price.rescale(PRICE_DISPLAY_DECIMALS);
        price.to_string()
    }
}

impl fmt::Display for CurrencyQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.unit_price)
    }
}

/// Raw record as delivered by a price feed, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Currency code; feeds occasionally omit it.
    #[serde(default)]
    pub currency: Option<String>,
    /// Quote timestamp as reported by the feed.
    #[serde(default)]
    pub date: Option<String>,
    /// Unit price as a JSON number.
    #[serde(default)]
    pub price: Option<f64>,
}

impl PriceRecord {
    /// Create a record with a currency and price.
    pub fn new(currency: impl Into<String>, price: f64) -> Self {
        Self {
            currency: Some(currency.into()),
            date: None,
            price: Some(price),
        }
    }

    /// Validate the record into a quote.
    pub fn to_quote(&self) -> Result<CurrencyQuote, QuoteError> {
        let symbol = self
            .currency
            .as_deref()
            .map(Symbol::new)
            .ok_or(QuoteError::MissingSymbol)?;

        let raw = self.price.ok_or_else(|| QuoteError::MissingPrice(symbol.clone()))?;
        if !raw.is_finite() || raw <= 0.0 {
            return Err(QuoteError::NonPositivePrice {
                symbol,
                price: raw.to_string(),
            });
        }

        let unit_price =
            Decimal::from_f64(raw).ok_or_else(|| QuoteError::UnrepresentablePrice {
                symbol: symbol.clone(),
                price: raw.to_string(),
            })?;

        CurrencyQuote::new(symbol, unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbol_preserves_case() {
        let symbol = Symbol::new(" bNEO ");
        assert_eq!(symbol.code(), "bNEO");
        assert_ne!(symbol, Symbol::new("BNEO"));
    }

    #[test]
    fn test_quote_rejects_non_positive_price() {
        assert!(CurrencyQuote::new(Symbol::new("ETH"), dec!(0)).is_err());
        assert!(CurrencyQuote::new(Symbol::new("ETH"), dec!(-1)).is_err());
        assert!(CurrencyQuote::new(Symbol::new(""), dec!(1)).is_err());
        assert!(CurrencyQuote::new(Symbol::new("ETH"), dec!(1645.93)).is_ok());
    }

    #[test]
    fn test_record_to_quote() {
        let quote = PriceRecord::new("USDC", 0.99).to_quote().unwrap();
        assert_eq!(quote.symbol, Symbol::new("USDC"));
        assert_eq!(quote.unit_price, dec!(0.99));

        let missing_price = PriceRecord {
            currency: Some("LUNA".to_string()),
            date: None,
            price: None,
        };
        assert!(matches!(
            missing_price.to_quote(),
            Err(QuoteError::MissingPrice(_))
        ));

        let missing_symbol = PriceRecord {
            currency: None,
            date: None,
            price: Some(1.0),
        };
        assert!(matches!(
            missing_symbol.to_quote(),
            Err(QuoteError::MissingSymbol)
        ));

        assert!(PriceRecord::new("ZERO", 0.0).to_quote().is_err());
        assert!(PriceRecord::new("NAN", f64::NAN).to_quote().is_err());
    }

    #[test]
    fn test_record_with_huge_price_is_unrepresentable() {
        assert!(matches!(
            PriceRecord::new("HUGE", 1e40).to_quote(),
            Err(QuoteError::UnrepresentablePrice { .. })
        ));
        assert!(matches!(
            PriceRecord::new("NEG", -1e40).to_quote(),
            Err(QuoteError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn test_record_deserializes_feed_shape() {
        let json = r#"{"currency":"ETH","date":"2023-08-29T07:10:52.000Z","price":1645.9337373737374}"#;
        let record: PriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.currency.as_deref(), Some("ETH"));
        assert!(record.date.is_some());

        let partial: PriceRecord = serde_json::from_str(r#"{"currency":"ETH"}"#).unwrap();
        assert!(partial.price.is_none());
    }

    #[test]
    fn test_display_price() {
        let quote = CurrencyQuote::new(Symbol::new("ETH"), dec!(1645.9337)).unwrap();
        assert_eq!(quote.display_price(), "1645.93");

        let quote = CurrencyQuote::new(Symbol::new("USD"), dec!(1)).unwrap();
        assert_eq!(quote.display_price(), "1.00");
    }
}
