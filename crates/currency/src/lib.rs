//! Currency conversion strategies.
//!
//! Prices are stored in the base currency and converted per request. Each
//! supported currency contributes one [`ConversionStrategy`]; the
//! [`CurrencyRegistry`] collects them into an immutable lookup table at
//! startup.

pub mod registry;
pub mod rounding;
pub mod strategy;

pub use registry::{CurrencyRegistry, RegistryError};
pub use rounding::round_price;
pub use strategy::{BaseCurrency, ConversionStrategy, FixedRateCurrency};
