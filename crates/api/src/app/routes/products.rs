use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", get(list_products))
}

/// GET /products?pageStart=0&pageSize=5&currency=EUR
///
/// Query parameters:
/// - `pageStart`: zero-based offset (default: 0)
/// - `pageSize`: items per page, 1..=max (default: 10, capped at max)
/// - `currency`: 3-letter code, case-insensitive (default: GBP)
///
/// Response: `{items: [{name, price, currency}], totalCount, pageStart, pageSize}`
/// with `price` a 2-decimal string.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ProductListQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_query",
                rejection.body_text(),
            );
        }
    };
    let catalog = services.catalog();
    let request = match query.validate(services.max_page_size(), catalog.currencies()) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match catalog
        .get_products(request.page_start, request.page_size, &request.currency)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
