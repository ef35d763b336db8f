use std::sync::Arc;

use thiserror::Error;

use catalog_products::ProductPage;

/// Product store operation error.
///
/// `Clone` so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Transient I/O failure talking to the backing store.
    #[error("product store unavailable: {0}")]
    Unavailable(String),

    /// The fetch task died (panicked or was aborted) before producing a page.
    #[error("product fetch interrupted: {0}")]
    Interrupted(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Read-only, paginated source of products.
///
/// ## Fetch Semantics
///
/// `fetch()`:
/// - `page_start` omitted → start at 0
/// - `page_size` omitted → return everything from `page_start` onwards
/// - returns the page in store order plus the total size of the dataset
/// - a `page_start` past the end yields an empty page (not an error)
///
/// Implementations must be safe to call concurrently. Failures are reported
/// as-is; callers do not retry.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch(
        &self,
        page_start: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPage, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn fetch(
        &self,
        page_start: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPage, StoreError> {
        (**self).fetch(page_start, page_size).await
    }
}
