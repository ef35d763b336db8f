//! `catalog-core` — domain foundation building blocks for the product catalog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod currency;
pub mod error;
pub mod pagination;
pub mod value_object;

pub use currency::CurrencyCode;
pub use error::DomainError;
pub use pagination::{PageKey, PagedResult};
pub use value_object::ValueObject;
