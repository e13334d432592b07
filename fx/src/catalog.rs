//! Price catalog with replace-on-refresh storage.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use swapdesk_common::{CurrencyQuote, PriceRecord, Symbol};
use tracing::{debug, warn};

/// Immutable set of tradable currencies, in feed order, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    quotes: Vec<CurrencyQuote>,
    index: HashMap<Symbol, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from validated quotes. The first quote for a symbol wins.
    pub fn from_quotes(quotes: impl IntoIterator<Item = CurrencyQuote>) -> Self {
        let mut catalog = Self::empty();
        for quote in quotes {
            catalog.push(quote);
        }
        catalog
    }

    /// Build a catalog from raw feed records, dropping invalid and duplicate ones.
    pub fn ingest(records: &[PriceRecord]) -> (Self, IngestReport) {
        let mut catalog = Self::empty();
        let mut report = IngestReport::default();

        for record in records {
            match record.to_quote() {
                Ok(quote) => {
                    if catalog.push(quote) {
                        report.accepted += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Dropping price record");
                    report.invalid += 1;
                }
            }
        }

        if report.invalid > 0 || report.duplicates > 0 {
            warn!(
                accepted = report.accepted,
                invalid = report.invalid,
                duplicates = report.duplicates,
                "Price feed contained unusable records"
            );
        }

        (catalog, report)
    }

    /// Look up a quote by symbol.
    pub fn get(&self, symbol: &str) -> Option<&CurrencyQuote> {
        self.index.get(symbol).map(|&i| &self.quotes[i])
    }

    /// Check if a symbol is tradable.
    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// All quotes in feed order.
    pub fn quotes(&self) -> &[CurrencyQuote] {
        &self.quotes
    }

    /// All symbols in feed order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.quotes.iter().map(|q| &q.symbol)
    }

    /// Unit price of a symbol formatted for display.
    pub fn display_price(&self, symbol: &str) -> Option<String> {
        self.get(symbol).map(CurrencyQuote::display_price)
    }

    /// Get the number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn push(&mut self, quote: CurrencyQuote) -> bool {
        if self.index.contains_key(&quote.symbol) {
            return false;
        }
        self.index.insert(quote.symbol.clone(), self.quotes.len());
        self.quotes.push(quote);
        true
    }
}

/// Outcome of ingesting a raw price list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Records that became quotes.
    pub accepted: usize,
    /// Records with a missing symbol or a missing/non-positive price.
    pub invalid: usize,
    /// Records for a symbol already in the catalog.
    pub duplicates: usize,
}

/// Holds the current catalog and swaps it wholesale on refresh.
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl CatalogStore {
    /// Create a store holding an empty catalog.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Catalog::empty())),
            refreshed_at: RwLock::new(None),
        }
    }

    /// Snapshot of the current catalog.
    pub fn current(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Replace the catalog.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        *self.current.write() = catalog.clone();
        *self.refreshed_at.write() = Some(Utc::now());
        debug!(quotes = catalog.len(), "Catalog replaced");
        catalog
    }

    /// Get catalog statistics.
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            quotes: self.current.read().len(),
            refreshed_at: *self.refreshed_at.read(),
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog statistics.
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub quotes: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Shared catalog store.
pub type SharedCatalogStore = Arc<CatalogStore>;
