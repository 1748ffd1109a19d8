use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockdesk_core::DomainError;
use stockdesk_infra::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::ProductNotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        StoreError::SupplierNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found")
        }
        StoreError::WouldGoNegative { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_stock",
            err.to_string(),
        ),
        StoreError::QuantityOverflow => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        StoreError::Unavailable => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "storage error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}
