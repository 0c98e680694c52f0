// apps/storefront_app/src/web/handlers/notification_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use storefront::models::PageRequest;
use tracing::instrument;
use uuid::Uuid;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_notifications", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn list_notifications(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state
    .services
    .notifications
    .list(user.id(), query.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::unread_notifications", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn unread_notifications(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let unread = app_state.services.notifications.unread(user.id()).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": unread.len(), "notifications": unread })))
}

#[instrument(name = "handler::mark_notification_read", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn mark_read(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state
    .services
    .notifications
    .mark_read(user.id(), path.into_inner())
    .await?;
  Ok(message("notification marked as read"))
}

#[instrument(name = "handler::mark_all_notifications_read", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn mark_all_read(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let updated = app_state.services.notifications.mark_all_read(user.id()).await?;
  Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

#[instrument(name = "handler::delete_notification", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn delete_notification(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state
    .services
    .notifications
    .delete(user.id(), path.into_inner())
    .await?;
  Ok(message("notification deleted"))
}
