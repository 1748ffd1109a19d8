use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockdesk_auth::Capability;

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/low-stock", get(low_stock))
        .route("/movements-per-day", get(movements_per_day))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    match services.reports().dashboard_stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    match services.reports().low_stock_products() {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn movements_per_day(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    let days = match params.get("days") {
        Some(raw) => match raw.parse::<u32>() {
            Ok(days) if days >= 1 => days,
            _ => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "days must be a positive integer",
                )
            }
        },
        None => 7,
    };

    match services.reports().movements_per_day(days) {
        Ok(series) => (StatusCode::OK, Json(serde_json::json!({ "series": series }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
