use axum::{Router, routing::get};

pub mod products;
pub mod system;

/// Router for the catalogue endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/currencies", get(system::currencies))
        .nest("/products", products::router())
}
