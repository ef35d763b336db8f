use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::CurrencyCode;

/// A catalogue entry as held by the product store.
///
/// Prices are in the base currency (`CurrencyCode::BASE`). Products are
/// immutable once loaded; the service only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    name: String,
    #[serde(with = "rust_decimal::serde::str")]
    base_price: Decimal,
}

impl Product {
    pub fn new(name: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            name: name.into(),
            base_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_price(&self) -> Decimal {
        self.base_price
    }

    /// Project this product into a response row priced in `currency`.
    ///
    /// `price` must already be converted and rounded by the caller.
    pub fn to_dto(&self, price: Decimal, currency: &CurrencyCode) -> ProductDto {
        ProductDto {
            name: self.name.clone(),
            price,
            currency: currency.clone(),
        }
    }
}

/// One page of products plus the size of the whole dataset at fetch time.
///
/// This is the currency-agnostic unit the page cache stores.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_count: u64,
}

impl ProductPage {
    pub fn new(products: Vec<Product>, total_count: u64) -> Self {
        Self {
            products,
            total_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Output row: a product rendered in the requested currency.
///
/// Constructed fresh per request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub currency: CurrencyCode,
}
