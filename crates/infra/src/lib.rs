//! Infrastructure layer: product store adapters, page cache, catalogue
//! orchestration and runtime configuration.

pub mod cache;
pub mod catalog_service;
pub mod config;
pub mod product_store;

pub use cache::{DEFAULT_PAGE_TTL, PageCache, ReadThroughCache};
pub use catalog_service::{CatalogError, CatalogService};
pub use config::{CatalogConfig, ConfigError};
pub use product_store::{InMemoryProductStore, ProductStore, StoreError};
