//! SwapDesk Common Types
//!
//! This crate contains the shared types of the SwapDesk swap core: currency
//! quotes, the swap intent, the swap lifecycle state and error definitions.

pub mod quote;
pub mod intent;
pub mod state;
pub mod error;
pub mod time;

pub use quote::*;
pub use intent::*;
pub use state::*;
pub use error::*;
pub use time::*;
