//! Products domain module (read-only catalogue).
//!
//! This crate contains the catalogue's record types, implemented purely as
//! data (no IO, no HTTP, no storage).

pub mod product;

pub use product::{Product, ProductDto, ProductPage};
