use std::sync::Arc;

use catalog_currency::CurrencyRegistry;
use catalog_infra::{
    CatalogConfig, CatalogService, ConfigError, InMemoryProductStore, PageCache, ProductStore,
};

/// Type-erased catalogue service; the store backend is chosen at startup.
pub type DynCatalogService = CatalogService<dyn ProductStore>;

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    catalog: DynCatalogService,
    max_page_size: u32,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn ProductStore>,
        currencies: CurrencyRegistry,
        cache: PageCache,
        max_page_size: u32,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store, cache, Arc::new(currencies)),
            max_page_size,
        }
    }

    /// In-memory wiring (dev/test): seeded catalogue behind the page cache.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::seeded());
        Self::with_store(store, config)
    }

    pub fn with_store(store: Arc<dyn ProductStore>, config: &CatalogConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            store,
            config.currency_registry()?,
            PageCache::with_ttl(config.cache_ttl),
            config.max_page_size,
        ))
    }

    pub fn catalog(&self) -> &DynCatalogService {
        &self.catalog
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}
