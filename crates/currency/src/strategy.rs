//! Per-currency conversion policies.

use rust_decimal::Decimal;

use catalog_core::CurrencyCode;

use crate::registry::RegistryError;
use crate::rounding::round_price;

/// One currency's price transformation.
///
/// Implementations are immutable after construction and shared across
/// requests, so they must be `Send + Sync`.
pub trait ConversionStrategy: Send + Sync + core::fmt::Debug {
    /// Code this strategy is registered under.
    fn currency_code(&self) -> &CurrencyCode;

    /// Convert a base-currency price. The result is rounded to 2 dp.
    ///
    /// Fails with [`RegistryError::Overflow`] when the converted price does
    /// not fit in a `Decimal`.
    fn convert(&self, base_price: Decimal) -> Result<Decimal, RegistryError>;
}

/// The base currency: no rate applied, but still rounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCurrency {
    code: CurrencyCode,
}

impl BaseCurrency {
    pub fn new() -> Self {
        Self {
            code: CurrencyCode::base(),
        }
    }
}

impl Default for BaseCurrency {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionStrategy for BaseCurrency {
    fn currency_code(&self) -> &CurrencyCode {
        &self.code
    }

    fn convert(&self, base_price: Decimal) -> Result<Decimal, RegistryError> {
        Ok(round_price(base_price))
    }
}

/// A currency with a fixed exchange rate relative to the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRateCurrency {
    code: CurrencyCode,
    rate: Decimal,
}

impl FixedRateCurrency {
    /// Rates must be strictly positive; anything else is a configuration error.
    pub fn new(code: CurrencyCode, rate: Decimal) -> Result<Self, RegistryError> {
        if rate <= Decimal::ZERO {
            return Err(RegistryError::NonPositiveRate { code, rate });
        }
        Ok(Self { code, rate })
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

impl ConversionStrategy for FixedRateCurrency {
    fn currency_code(&self) -> &CurrencyCode {
        &self.code
    }

    fn convert(&self, base_price: Decimal) -> Result<Decimal, RegistryError> {
        base_price
            .checked_mul(self.rate)
            .map(round_price)
            .ok_or_else(|| RegistryError::Overflow {
                code: self.code.clone(),
                base_price,
            })
    }
}
