//! In-process read-through caching.

pub mod read_through;

pub use read_through::{DEFAULT_PAGE_TTL, PageCache, ReadThroughCache};
