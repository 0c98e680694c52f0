// apps/storefront_app/src/web/handlers/custom_order_handlers.rs

use actix_web::{web, HttpResponse};
use storefront::models::NewCustomOrder;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::create_custom_order", skip(app_state, user, body), fields(user_id = %user.id()))]
pub async fn create_custom_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<NewCustomOrder>,
) -> Result<HttpResponse, AppError> {
  let request = app_state
    .services
    .custom_orders
    .create(user.id(), body.into_inner())
    .await?;
  info!(custom_order_id = %request.id, "Custom order submitted.");
  Ok(HttpResponse::Created().json(request))
}

#[instrument(name = "handler::my_custom_orders", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn my_custom_orders(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let requests = app_state.services.custom_orders.list_mine(user.id()).await?;
  Ok(HttpResponse::Ok().json(requests))
}

#[instrument(name = "handler::get_custom_order", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn get_custom_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let request = app_state.services.custom_orders.get(user.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(request))
}

#[instrument(name = "handler::cancel_custom_order", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn cancel_custom_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let request = app_state
    .services
    .custom_orders
    .cancel(user.id(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(request))
}
