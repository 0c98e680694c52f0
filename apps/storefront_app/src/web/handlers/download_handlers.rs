// apps/storefront_app/src/web/handlers/download_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::models::PageRequest;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateDownloadPayload {
  pub order_id: Uuid,
  pub product_id: Uuid,
}

#[instrument(name = "handler::list_downloads", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn list_downloads(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state
    .services
    .downloads
    .list_user_downloads(user.id(), query.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::can_download", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn can_download(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let allowed = app_state
    .services
    .downloads
    .can_download(user.id(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "can_download": allowed })))
}

#[instrument(
  name = "handler::create_download",
  skip(app_state, user, body),
  fields(user_id = %user.id(), order_id = %body.order_id, product_id = %body.product_id)
)]
pub async fn create_download(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<CreateDownloadPayload>,
) -> Result<HttpResponse, AppError> {
  let grant = app_state
    .services
    .downloads
    .create_download(user.id(), body.order_id, body.product_id)
    .await?;
  info!(download_id = %grant.id, expires_at = %grant.expires_at, "Download link issued.");
  Ok(HttpResponse::Created().json(grant))
}

#[instrument(name = "handler::download_history", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn download_history(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let history = app_state
    .services
    .downloads
    .download_history(user.id(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(history))
}
