//! Price book: a price source paired with the catalog it feeds.

use std::sync::Arc;

use swapdesk_common::{CurrencyQuote, Symbol};
use tracing::{info, instrument};

use crate::catalog::{Catalog, CatalogStats, CatalogStore, IngestReport};
use crate::conversion::{convert, ExchangeRate};
use crate::error::{FxError, FxResult};
use crate::provider::PriceSource;

/// Owns the session's catalog and refreshes it from a price source.
pub struct PriceBook {
    source: Arc<dyn PriceSource>,
    store: CatalogStore,
}

impl PriceBook {
    /// Create a price book with an empty catalog.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            store: CatalogStore::new(),
        }
    }

    /// Fetch prices and replace the catalog.
    ///
    /// On any error the previous catalog stays in place.
    #[instrument(skip(self), fields(source = %self.source.name()))]
    pub async fn refresh(&self) -> FxResult<IngestReport> {
        let records = self.source.fetch_prices().await?;
        let (catalog, report) = Catalog::ingest(&records);

        if catalog.is_empty() {
            return Err(FxError::EmptyCatalog(self.source.name().to_string()));
        }

        self.store.replace(catalog);

        info!(
            accepted = report.accepted,
            invalid = report.invalid,
            duplicates = report.duplicates,
            "Catalog refreshed"
        );

        Ok(report)
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.store.current()
    }

    /// Look up a quote.
    pub fn quote(&self, symbol: &str) -> Option<CurrencyQuote> {
        self.store.current().get(symbol).cloned()
    }

    /// Rate between two currencies under the current catalog.
    pub fn rate(&self, sell: &Symbol, buy: &Symbol) -> Option<ExchangeRate> {
        ExchangeRate::between(sell, buy, &self.store.current())
    }

    /// Convert a sell amount under the current catalog.
    pub fn convert(&self, sell: Option<&Symbol>, buy: Option<&Symbol>, amount: &str) -> Option<String> {
        convert(sell, buy, amount, &self.store.current())
    }

    /// Get the price source name.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Get catalog statistics.
    pub fn stats(&self) -> CatalogStats {
        self.store.stats()
    }
}
