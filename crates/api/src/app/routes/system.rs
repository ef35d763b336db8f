use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /currencies
///
/// Codes accepted by the `currency` query parameter.
pub async fn currencies(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let codes: Vec<String> = services
        .catalog()
        .currencies()
        .codes()
        .into_iter()
        .map(String::from)
        .collect();

    Json(serde_json::json!({
        "currencies": codes,
        "maxPageSize": services.max_page_size(),
    }))
}
