//! Price source traits and implementations.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use swapdesk_common::PriceRecord;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};

/// Trait for price list providers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch the full list of `{currency, price}` records.
    async fn fetch_prices(&self) -> FxResult<Vec<PriceRecord>>;
}

/// Where a JSON price list lives.
#[derive(Debug, Clone)]
enum JsonOrigin {
    File(PathBuf),
    Inline(String),
}

/// Reads a JSON array of `{currency, date, price}` objects.
///
/// Elements that are not objects of that shape are skipped rather than
/// failing the whole list.
#[derive(Debug, Clone)]
pub struct JsonPriceSource {
    name: String,
    origin: JsonOrigin,
}

impl JsonPriceSource {
    /// Read prices from a file on each fetch.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("json:{}", path.display()),
            origin: JsonOrigin::File(path),
        }
    }

    /// Serve prices from an in-memory JSON document.
    pub fn from_json(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: JsonOrigin::Inline(json.into()),
        }
    }

    /// Decode a price list document.
    pub fn parse(json: &str) -> FxResult<Vec<PriceRecord>> {
        let elements: Vec<Value> = serde_json::from_str(json)?;
        let total = elements.len();

        let records: Vec<PriceRecord> = elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value(element) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed price element");
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!(
                skipped = total - records.len(),
                total,
                "Price list contained malformed elements"
            );
        }

        Ok(records)
    }
}

#[async_trait]
impl PriceSource for JsonPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_prices(&self) -> FxResult<Vec<PriceRecord>> {
        let document = match &self.origin {
            JsonOrigin::File(path) => tokio::fs::read_to_string(path).await?,
            JsonOrigin::Inline(json) => json.clone(),
        };

        Self::parse(&document)
    }
}

/// Serves a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    records: Vec<PriceRecord>,
}

impl StaticPriceSource {
    /// Create a source from records.
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    /// Create a source from `(currency, price)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(currency, price)| PriceRecord::new(currency, price))
                .collect(),
        )
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_prices(&self) -> FxResult<Vec<PriceRecord>> {
        Ok(self.records.clone())
    }
}

/// Price source that always fails, for exercising refresh errors.
#[cfg(any(test, feature = "test-utils"))]
pub struct UnavailablePriceSource;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceSource for UnavailablePriceSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn fetch_prices(&self) -> FxResult<Vec<PriceRecord>> {
        Err(FxError::SourceUnavailable {
            source_name: self.name().to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
