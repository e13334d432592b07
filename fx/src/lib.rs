//! SwapDesk FX
//!
//! Pure pricing logic for the swap form.
//!
//! # Features
//!
//! - Sell-amount sanitizing that keeps the stored amount always valid
//! - Price catalog built from an untrusted feed, replaced wholesale on refresh
//! - Cross-rate conversion to six fixed decimal places
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapdesk_fx::{PriceBook, StaticPriceSource};
//! use swapdesk_common::Symbol;
//!
//! let book = PriceBook::new(Arc::new(StaticPriceSource::from_pairs([
//!     ("USD", 1.0),
//!     ("ETH", 3000.0),
//! ])));
//! book.refresh().await?;
//!
//! let eth = book.convert(Some(&Symbol::new("USD")), Some(&Symbol::new("ETH")), "3000");
//! assert_eq!(eth.as_deref(), Some("1.000000"));
//! ```

pub mod amount;
pub mod catalog;
pub mod conversion;
pub mod engine;
pub mod provider;
pub mod error;

pub use amount::{parse_amount, sanitize};
pub use catalog::{Catalog, CatalogStore, IngestReport};
pub use conversion::{convert, ExchangeRate};
pub use engine::PriceBook;
pub use provider::{JsonPriceSource, PriceSource, StaticPriceSource};
pub use error::{FxError, FxResult};
