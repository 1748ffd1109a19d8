use axum::{routing::get, Router};

pub mod common;
pub mod movements;
pub mod products;
pub mod reports;
pub mod stream;
pub mod suppliers;
pub mod system;
pub mod uploads;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(stream::stream_changes))
        .nest("/products", products::router())
        .nest("/suppliers", suppliers::router())
        .nest("/movements", movements::router())
        .nest("/reports", reports::router())
        .nest("/uploads", uploads::router())
}
