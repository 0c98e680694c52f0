// apps/storefront_app/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod catalog_handlers;
pub mod custom_order_handlers;
pub mod download_handlers;
pub mod notification_handlers;
pub mod order_handlers;
pub mod review_handlers;
pub mod user_handlers;
pub mod wishlist_handlers;

use actix_web::{http::header, HttpRequest, HttpResponse};
use serde_json::json;
use storefront::files::UploadedFile;

pub(crate) fn message(text: &str) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "message": text }))
}

/// Wraps a raw request body as an upload. The content type comes from the
/// request header and the file name from `X-File-Name` when present.
pub(crate) fn raw_upload(req: &HttpRequest, body: actix_web::web::Bytes, fallback_name: &str) -> UploadedFile {
  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string();
  let file_name = req
    .headers()
    .get("X-File-Name")
    .and_then(|v| v.to_str().ok())
    .filter(|v| !v.trim().is_empty())
    .unwrap_or(fallback_name)
    .to_string();
  UploadedFile::new(file_name, content_type, body.to_vec())
}
