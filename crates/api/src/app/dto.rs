use serde::Deserialize;

use stockdesk_core::{CategoryId, SupplierId};
use stockdesk_inventory::{Product, StockMovement};
use stockdesk_suppliers::{ContactInfo, Supplier};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price_cents: u64,
    pub minimum_stock: Option<i64>,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price_cents: Option<u64>,
    pub minimum_stock: Option<i64>,
    pub category_id: Option<CategoryId>,
    /// Direct catalog quantity edit, applied through the store's atomic
    /// adjust so the non-negative invariant still holds.
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: Option<ContactInfo>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub contact: Option<ContactInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMovementRequest {
    /// Raw form value; may be empty or the "new" placeholder, which the
    /// movement service rejects without touching storage.
    #[serde(default)]
    pub product_id: String,
    pub quantity: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub supplier_id: Option<SupplierId>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "quantity": p.quantity,
        "minimum_stock": p.minimum_stock,
        "price_cents": p.price_cents,
        "category_id": p.category_id.map(|c| c.to_string()),
        "low_stock": p.is_low_stock(),
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
    })
}

pub fn supplier_to_json(s: &Supplier) -> serde_json::Value {
    serde_json::json!({
        "id": s.id.to_string(),
        "name": s.name,
        "tax_id": s.tax_id,
        "email": s.contact.email,
        "phone": s.contact.phone,
        "address": s.contact.address,
    })
}

pub fn movement_to_json(m: &StockMovement) -> serde_json::Value {
    serde_json::json!({
        "id": m.id.to_string(),
        "product_id": m.product_id.to_string(),
        "quantity": m.quantity,
        "type": m.kind.as_str(),
        "occurred_at": m.occurred_at.to_rfc3339(),
        "supplier_id": m.supplier_id.map(|s| s.to_string()),
        "notes": m.notes,
        "recorded_by": m.recorded_by.map(|u| u.to_string()),
    })
}
