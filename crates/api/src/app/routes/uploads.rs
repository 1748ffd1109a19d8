//! Product image uploads.
//!
//! Contract:
//! - `POST /uploads/product-image` with a multipart image field
//! - jpeg/png/webp/gif only, at most 5,242,880 bytes
//! - success: `{ "url": ..., "path": ... }`, failure: `{ "error": ... }`

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::warn;

use stockdesk_auth::Capability;

use crate::app::routes::common::require;
use crate::config::AppConfig;
use crate::context::PrincipalContext;

pub const MAX_IMAGE_BYTES: usize = 5_242_880;

pub fn router() -> Router {
    Router::new()
        .route("/product-image", post(upload_product_image))
        .route("/files/:name", get(serve_file))
        // Multipart framing overhead on top of the image cap.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn upload_error(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn upload_product_image(
    Extension(config): Extension<Arc<AppConfig>>,
    Extension(principal): Extension<PrincipalContext>,
    mut multipart: Multipart,
) -> axum::response::Response {
    if let Err(resp) = require(&principal, Capability::UploadImages) {
        return resp;
    }

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return upload_error(StatusCode::BAD_REQUEST, "no file provided"),
        Err(_) => return upload_error(StatusCode::BAD_REQUEST, "malformed multipart body"),
    };

    let content_type = field.content_type().unwrap_or("").to_string();
    let Some(extension) = extension_for(&content_type) else {
        return upload_error(
            StatusCode::BAD_REQUEST,
            "unsupported image type; use jpeg, png, webp or gif",
        );
    };

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(_) => return upload_error(StatusCode::BAD_REQUEST, "failed to read upload"),
    };
    if bytes.len() > MAX_IMAGE_BYTES {
        return upload_error(StatusCode::BAD_REQUEST, "image exceeds the 5 MB limit");
    }
    if bytes.is_empty() {
        return upload_error(StatusCode::BAD_REQUEST, "empty file");
    }

    let file_name = format!("{}.{}", uuid::Uuid::now_v7(), extension);
    let path = config.upload_dir.join(&file_name);

    if let Err(err) = tokio::fs::create_dir_all(&config.upload_dir).await {
        warn!(error = %err, "cannot create upload directory");
        return upload_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to store image");
    }
    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        warn!(error = %err, path = %path.display(), "image write failed");
        return upload_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to store image");
    }

    let body = serde_json::json!({
        "url": format!("/uploads/files/{file_name}"),
        "path": path.display().to_string(),
    });
    (StatusCode::CREATED, Json(body)).into_response()
}

pub async fn serve_file(
    Extension(config): Extension<Arc<AppConfig>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    // Single path segment only; anything else is a traversal attempt.
    if name.contains('/') || name.contains("..") || name.contains('\\') {
        return upload_error(StatusCode::BAD_REQUEST, "invalid file name");
    }

    let content_type = match name.rsplit('.').next() {
        Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    match tokio::fs::read(config.upload_dir.join(&name)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(_) => upload_error(StatusCode::NOT_FOUND, "file not found"),
    }
}
