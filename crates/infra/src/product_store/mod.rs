//! Paginated product source boundary.
//!
//! This module defines an infrastructure-facing abstraction over wherever the
//! catalogue actually lives, without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use r#trait::{ProductStore, StoreError};
