//! Catalogue read pipeline (application-level orchestration).
//!
//! ```text
//! get_products(page_start, page_size, currency)
//!   ↓
//! 1. PageKey { page_start, page_size }
//!   ↓
//! 2. Page cache (hit → cached page; miss → one store fetch, shared by concurrent callers)
//!   ↓
//! 3. Empty page → empty result, total forced to 0
//!   ↓
//! 4. Resolve the currency's conversion strategy
//!   ↓
//! 5. Convert every product (never cached), keep store order
//! ```
//!
//! Conversion runs on every call, so one cached page can be rendered in any
//! supported currency without duplicating cache entries.

use std::sync::Arc;

use thiserror::Error;

use catalog_core::{CurrencyCode, PageKey, PagedResult};
use catalog_currency::CurrencyRegistry;
use catalog_products::ProductDto;

use crate::cache::PageCache;
use crate::product_store::{ProductStore, StoreError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The product store failed. Propagated unchanged, never retried.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    /// The caller broke the service's preconditions (zero page size,
    /// unregistered currency), or a stored price could not be converted.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

/// Serves currency-rendered product pages through the page cache.
///
/// ## Generic Parameters
///
/// - `S`: Product store implementation (must implement `ProductStore`); may be
///   `dyn ProductStore` when the backend is chosen at runtime
#[derive(Debug)]
pub struct CatalogService<S: ?Sized> {
    store: Arc<S>,
    cache: PageCache,
    currencies: Arc<CurrencyRegistry>,
}

impl<S> CatalogService<S>
where
    S: ProductStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, cache: PageCache, currencies: Arc<CurrencyRegistry>) -> Self {
        Self {
            store,
            cache,
            currencies,
        }
    }

    pub fn currencies(&self) -> &CurrencyRegistry {
        &self.currencies
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Fetch one page of products priced in `currency`.
    ///
    /// `page_size` must be > 0 and `currency` must be registered; the front
    /// door validates both. A page that comes back empty yields an empty
    /// result with `total_count = 0`, whatever total the store reported and
    /// whatever the currency.
    pub async fn get_products(
        &self,
        page_start: u32,
        page_size: u32,
        currency: &CurrencyCode,
    ) -> Result<PagedResult<ProductDto>, CatalogError> {
        if page_size == 0 {
            tracing::error!(page_start, "get_products called with page_size 0");
            return Err(CatalogError::ContractViolation(
                "page_size must be greater than 0".to_string(),
            ));
        }

        let key = PageKey::new(page_start, page_size);
        let store = Arc::clone(&self.store);
        let page = self
            .cache
            .get_or_fetch(key, move || async move {
                store.fetch(Some(page_start), Some(page_size)).await
            })
            .await?;

        if page.is_empty() {
            return Ok(PagedResult::empty(key));
        }

        let converter = self.currencies.resolve(currency).map_err(|err| {
            tracing::error!(%currency, "unvalidated currency reached catalog service");
            CatalogError::ContractViolation(err.to_string())
        })?;

        let items = page
            .products
            .iter()
            .map(|product| {
                let price = converter.convert(product.base_price()).map_err(|err| {
                    tracing::error!(product = product.name(), %err, "price conversion failed");
                    CatalogError::ContractViolation(err.to_string())
                })?;
                Ok(product.to_dto(price, currency))
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        let result = PagedResult {
            items,
            total_count: page.total_count,
            page_start,
            page_size,
        };
        tracing::debug!(
            page_start,
            page_size,
            %currency,
            total_count = result.total_count,
            has_more = result.has_more(),
            "products page served"
        );
        Ok(result)
    }
}
