//! Immutable currency-code → strategy lookup table.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use catalog_core::CurrencyCode;

use crate::strategy::{BaseCurrency, ConversionStrategy, FixedRateCurrency};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two strategies claim the same code. Configuration error, fatal at startup.
    #[error("currency {0} registered more than once")]
    DuplicateCurrency(CurrencyCode),

    /// Exchange rates must be strictly positive. Configuration error.
    #[error("exchange rate for {code} must be > 0, got {rate}")]
    NonPositiveRate { code: CurrencyCode, rate: Decimal },

    /// Lookup of a code that was never registered.
    #[error("currency {0} is not supported")]
    UnknownCurrency(CurrencyCode),

    /// The converted price is outside the range of `Decimal`.
    #[error("price {base_price} overflows when converted to {code}")]
    Overflow { code: CurrencyCode, base_price: Decimal },
}

/// Supported currencies, built once and read-only afterwards.
///
/// Codes are normalised by [`CurrencyCode`], so lookups are case-insensitive
/// with respect to whatever the caller originally typed. Sharing needs no
/// locking.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    strategies: HashMap<CurrencyCode, Arc<dyn ConversionStrategy>>,
}

impl CurrencyRegistry {
    /// Build the registry, failing on the first duplicate code.
    pub fn new<I>(strategies: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn ConversionStrategy>>,
    {
        let mut map: HashMap<CurrencyCode, Arc<dyn ConversionStrategy>> = HashMap::new();
        for strategy in strategies {
            let code = strategy.currency_code().clone();
            if map.contains_key(&code) {
                return Err(RegistryError::DuplicateCurrency(code));
            }
            map.insert(code, strategy);
        }
        tracing::debug!(currencies = map.len(), "currency registry built");
        Ok(Self { strategies: map })
    }

    /// Base currency plus one fixed-rate strategy per `(code, rate)` pair.
    pub fn from_rates<I>(rates: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (CurrencyCode, Decimal)>,
    {
        let mut strategies: Vec<Arc<dyn ConversionStrategy>> = vec![Arc::new(BaseCurrency::new())];
        for (code, rate) in rates {
            strategies.push(Arc::new(FixedRateCurrency::new(code, rate)?));
        }
        Self::new(strategies)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.strategies.contains_key(code)
    }

    /// Registered codes, sorted for stable output.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<_> = self.strategies.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn resolve(&self, code: &CurrencyCode) -> Result<&dyn ConversionStrategy, RegistryError> {
        self.strategies
            .get(code)
            .map(|s| s.as_ref())
            .ok_or_else(|| RegistryError::UnknownCurrency(code.clone()))
    }

    pub fn convert(&self, code: &CurrencyCode, base_price: Decimal) -> Result<Decimal, RegistryError> {
        self.resolve(code)?.convert(base_price)
    }
}
