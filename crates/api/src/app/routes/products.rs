use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
    Json, Router,
};

use stockdesk_auth::Capability;
use stockdesk_core::ProductId;
use stockdesk_events::{ChangeOp, Table};
use stockdesk_infra::{CatalogStore, StockStore, StoreError};
use stockdesk_inventory::Product;

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/stock", get(get_stock))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageCatalog) {
        return resp;
    }

    let product = match Product::new(ProductId::new(), body.name, body.price_cents) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let mut product = product.with_minimum_stock(body.minimum_stock.unwrap_or(0));
    if let Some(category_id) = body.category_id {
        product = product.with_category(category_id);
    }
    let id = product.id;

    if let Err(e) = services.store().insert_product(product.clone()) {
        return errors::store_error_to_response(e);
    }
    services.notify_change(Table::Products, ChangeOp::Insert, Some(id));

    (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response()
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    match services.store().list_products() {
        Ok(products) => {
            let items: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.store().get_product(&product_id) {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Current stock read used by views. An absent row reads as 0 so unsaved
/// forms stay resilient.
pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    let Ok(product_id) = id.parse::<ProductId>() else {
        return (
            StatusCode::OK,
            Json(serde_json::json!({ "product_id": id, "current_stock": 0 })),
        )
            .into_response();
    };

    let stock = match services.store().get_current_stock(&product_id) {
        Ok(stock) => stock,
        Err(StoreError::ProductNotFound) => 0,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "product_id": product_id.to_string(),
            "current_stock": stock,
        })),
    )
        .into_response()
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageCatalog) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    let mut product = match services.store().get_product(&product_id) {
        Ok(Some(p)) => p,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    // Validate the whole request before the first store write so a rejected
    // PATCH never leaves a partially applied row behind.
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "name cannot be empty");
        }
    }
    if let Some(target_quantity) = body.quantity {
        if target_quantity < 0 {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "quantity cannot be negative",
            );
        }
    }
    let delta = body
        .quantity
        .map(|target| target - product.quantity)
        .unwrap_or(0);

    // Quantity first, through the atomic adjust so it cannot race a
    // concurrent movement and fails cleanly with nothing else committed.
    if delta != 0 {
        match services.store().update_product_quantity(&product_id, delta) {
            Ok(q) => product.quantity = q,
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Some(name) = body.name {
        product.name = name;
    }
    if let Some(price_cents) = body.price_cents {
        product.price_cents = price_cents;
    }
    if let Some(minimum_stock) = body.minimum_stock {
        product.minimum_stock = minimum_stock.max(0);
    }
    if let Some(category_id) = body.category_id {
        product.category_id = Some(category_id);
    }
    product.updated_at = chrono::Utc::now();

    if let Err(e) = services.store().update_product(product.clone()) {
        // Undo the quantity change so the row is not left half-edited.
        if delta != 0 {
            let _ = services.store().update_product_quantity(&product_id, -delta);
        }
        return errors::store_error_to_response(e);
    }

    services.notify_change(Table::Products, ChangeOp::Update, Some(product_id));
    (StatusCode::OK, Json(dto::product_to_json(&product))).into_response()
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageCatalog) {
        return resp;
    }

    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.store().delete_product(&product_id) {
        Ok(()) => {
            services.notify_change(Table::Products, ChangeOp::Delete, Some(product_id));
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
