use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockdesk_auth::Capability;
use stockdesk_core::SupplierId;
use stockdesk_events::{ChangeOp, Table};
use stockdesk_infra::SupplierStore;
use stockdesk_suppliers::Supplier;

use crate::app::routes::common::require;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route(
            "/:id",
            get(get_supplier).patch(update_supplier).delete(delete_supplier),
        )
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateSupplierRequest>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageSuppliers) {
        return resp;
    }

    let mut supplier = match Supplier::new(SupplierId::new(), body.name) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Some(tax_id) = body.tax_id {
        supplier = supplier.with_tax_id(tax_id);
    }
    if let Some(contact) = body.contact {
        supplier = supplier.with_contact(contact);
    }

    if let Err(e) = services.store().insert_supplier(supplier.clone()) {
        return errors::store_error_to_response(e);
    }
    services.notify_change(Table::Suppliers, ChangeOp::Insert, None);

    (StatusCode::CREATED, Json(dto::supplier_to_json(&supplier))).into_response()
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    match services.store().list_suppliers() {
        Ok(suppliers) => {
            let items: Vec<_> = suppliers.iter().map(dto::supplier_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ViewReports) {
        return resp;
    }

    let supplier_id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    match services.store().get_supplier(&supplier_id) {
        Ok(Some(supplier)) => {
            (StatusCode::OK, Json(dto::supplier_to_json(&supplier))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSupplierRequest>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageSuppliers) {
        return resp;
    }

    let supplier_id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    let mut supplier = match services.store().get_supplier(&supplier_id) {
        Ok(Some(s)) => s,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "supplier not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = supplier.update(body.name, body.tax_id, body.contact) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.store().update_supplier(supplier.clone()) {
        return errors::store_error_to_response(e);
    }
    services.notify_change(Table::Suppliers, ChangeOp::Update, None);

    (StatusCode::OK, Json(dto::supplier_to_json(&supplier))).into_response()
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::ManageSuppliers) {
        return resp;
    }

    let supplier_id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id"),
    };

    match services.store().delete_supplier(&supplier_id) {
        Ok(()) => {
            services.notify_change(Table::Suppliers, ChangeOp::Delete, None);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
