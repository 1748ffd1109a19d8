use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockdesk_auth::Capability;
use stockdesk_core::ProductId;
use stockdesk_infra::{NewMovement, RejectionClass, StockStore};
use stockdesk_inventory::MovementKind;

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(create_movement).get(list_movements))
}

pub async fn create_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateMovementRequest>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::RecordMovements) {
        return resp;
    }

    let kind: MovementKind = match body.kind.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("unknown movement type: {}", body.kind),
            )
        }
    };

    let outcome = services.movements().record(NewMovement {
        product_id: body.product_id,
        quantity: body.quantity,
        kind,
        notes: body.notes,
        supplier_id: body.supplier_id,
        recorded_by: Some(principal.user_id()),
    });

    if outcome.success {
        return (StatusCode::CREATED, Json(outcome)).into_response();
    }

    let status = match outcome.rejection {
        Some(RejectionClass::InsufficientStock) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(RejectionClass::NotFound) => StatusCode::NOT_FOUND,
        Some(RejectionClass::Storage) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(RejectionClass::InvalidInput) | None => StatusCode::BAD_REQUEST,
    };
    (status, Json(outcome)).into_response()
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    let product_id: Option<ProductId> = match params.get("product_id") {
        Some(raw) => match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
            }
        },
        None => None,
    };

    match services.store().list_movements(product_id.as_ref()) {
        Ok(movements) => {
            let items: Vec<_> = movements.iter().map(dto::movement_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
