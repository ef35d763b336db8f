//! Runtime configuration, read from the environment once at startup.
//!
//! | variable | default |
//! |---|---|
//! | `CATALOG_BIND_ADDR` | `0.0.0.0:8080` |
//! | `CATALOG_MAX_PAGE_SIZE` | `50` |
//! | `CATALOG_EXCHANGE_RATES` | `EUR=1.11` |
//!
//! The page cache TTL is fixed and not read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use catalog_core::CurrencyCode;
use catalog_currency::{CurrencyRegistry, RegistryError};

use crate::cache::DEFAULT_PAGE_TTL;

pub const BIND_ADDR_VAR: &str = "CATALOG_BIND_ADDR";
pub const MAX_PAGE_SIZE_VAR: &str = "CATALOG_MAX_PAGE_SIZE";
pub const EXCHANGE_RATES_VAR: &str = "CATALOG_EXCHANGE_RATES";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_EXCHANGE_RATES: &str = "EUR=1.11";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid currency configuration: {0}")]
    Currency(#[from] RegistryError),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound for `pageSize`, enforced by the HTTP layer.
    pub max_page_size: u32,
    /// Rates for non-base currencies, in configuration order.
    pub exchange_rates: Vec<(CurrencyCode, Decimal)>,
    pub cache_ttl: Duration,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build and validate a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid(BIND_ADDR_VAR, &bind_raw, e.to_string()))?;

        let max_page_size = match lookup(MAX_PAGE_SIZE_VAR) {
            Some(raw) => {
                let size = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| ConfigError::invalid(MAX_PAGE_SIZE_VAR, &raw, e.to_string()))?;
                if size == 0 {
                    return Err(ConfigError::invalid(MAX_PAGE_SIZE_VAR, &raw, "must be > 0"));
                }
                size
            }
            None => DEFAULT_MAX_PAGE_SIZE,
        };

        let rates_raw =
            lookup(EXCHANGE_RATES_VAR).unwrap_or_else(|| DEFAULT_EXCHANGE_RATES.to_string());
        let exchange_rates = parse_rates(&rates_raw)?;

        let config = Self {
            bind_addr,
            max_page_size,
            exchange_rates,
            cache_ttl: DEFAULT_PAGE_TTL,
        };

        // Fail at startup on duplicate codes or non-positive rates.
        config.currency_registry()?;
        Ok(config)
    }

    pub fn currency_registry(&self) -> Result<CurrencyRegistry, ConfigError> {
        Ok(CurrencyRegistry::from_rates(self.exchange_rates.iter().cloned())?)
    }
}

/// Parse `CODE=rate[,CODE=rate...]`. Empty items are skipped.
fn parse_rates(raw: &str) -> Result<Vec<(CurrencyCode, Decimal)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (code, rate) = item
                .split_once('=')
                .ok_or_else(|| ConfigError::invalid(EXCHANGE_RATES_VAR, raw, "expected CODE=rate"))?;
            let code = CurrencyCode::new(code)
                .map_err(|e| ConfigError::invalid(EXCHANGE_RATES_VAR, raw, e.to_string()))?;
            let rate = Decimal::from_str(rate.trim())
                .map_err(|e| ConfigError::invalid(EXCHANGE_RATES_VAR, raw, e.to_string()))?;
            Ok((code, rate))
        })
        .collect()
}
