//! Pagination contract shared by the store, the cache and the service.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Offset/limit pair identifying one cacheable page.
///
/// Two keys are equal iff both fields match. Currency is deliberately not
/// part of the key: conversion happens after the page leaves the cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    pub page_start: u32,
    pub page_size: u32,
}

impl PageKey {
    pub fn new(page_start: u32, page_size: u32) -> Self {
        Self {
            page_start,
            page_size,
        }
    }
}

impl ValueObject for PageKey {}

impl core::fmt::Display for PageKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}+{}]", self.page_start, self.page_size)
    }
}

/// Paginated response envelope.
///
/// `total_count` is the size of the whole dataset at fetch time, not the
/// number of `items` on this page. `page_start`/`page_size` echo the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_start: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    /// An empty page for `key`. The total is reported as zero.
    pub fn empty(key: PageKey) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_start: key.page_start,
            page_size: key.page_size,
        }
    }

    pub fn has_more(&self) -> bool {
        u64::from(self.page_start) + (self.items.len() as u64) < self.total_count
    }
}
