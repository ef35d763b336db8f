use axum::http::StatusCode;
use serde::Deserialize;

use catalog_core::CurrencyCode;
use catalog_currency::CurrencyRegistry;

use crate::app::errors;

/// Page size used when the client does not send one (capped at the max).
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// -------------------------
// Request DTOs
// -------------------------

/// Raw `GET /products` query string. Signed so negative values can be
/// rejected with a proper message instead of a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page_start: Option<i64>,
    pub page_size: Option<i64>,
    pub currency: Option<String>,
}

/// A query that passed validation: safe to hand to the catalogue service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListRequest {
    pub page_start: u32,
    pub page_size: u32,
    pub currency: CurrencyCode,
}

impl ProductListQuery {
    pub fn validate(
        self,
        max_page_size: u32,
        currencies: &CurrencyRegistry,
    ) -> Result<ProductListRequest, axum::response::Response> {
        let page_start = match self.page_start {
            None => 0,
            Some(start) => u32::try_from(start).map_err(|_| {
                errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_page_start",
                    format!("pageStart must be an integer between 0 and {}", u32::MAX),
                )
            })?,
        };

        let page_size = match self.page_size {
            None => DEFAULT_PAGE_SIZE.min(max_page_size),
            Some(size) if size > 0 && size <= i64::from(max_page_size) => size as u32,
            Some(_) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_page_size",
                    format!("pageSize must be between 1 and {max_page_size}"),
                ));
            }
        };

        let currency = match self.currency.as_deref() {
            None => CurrencyCode::base(),
            Some(raw) => raw.parse::<CurrencyCode>().map_err(|e| {
                errors::json_error(StatusCode::BAD_REQUEST, "invalid_currency", e.to_string())
            })?,
        };
        if !currencies.contains(&currency) {
            let supported: Vec<String> = currencies.codes().iter().map(|c| c.to_string()).collect();
            return Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "unsupported_currency",
                format!("currency must be one of: {}", supported.join(", ")),
            ));
        }

        Ok(ProductListRequest {
            page_start,
            page_size,
            currency,
        })
    }
}
