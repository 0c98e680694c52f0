// apps/storefront_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::models::PageRequest;
use tracing::{info, instrument};
use uuid::Uuid;

use super::raw_upload;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub product_id: Uuid,
  #[serde(default = "one")]
  pub quantity: i32,
  pub notes: Option<String>,
}

fn one() -> i32 {
  1
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, user, body),
  fields(user_id = %user.id(), product_id = %body.product_id, quantity = body.quantity)
)]
pub async fn create_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let body = body.into_inner();
  let order = app_state
    .services
    .orders
    .create_order(user.id(), body.product_id, body.quantity, body.notes)
    .await?;
  info!(order_id = %order.id, order_number = %order.order_number, "Order created.");
  Ok(HttpResponse::Created().json(json!({
    "message": "order created, upload your payment proof to continue",
    "order": order
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn list_orders(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state
    .services
    .orders
    .list_user_orders(user.id(), query.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_order", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn get_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.services.orders.get_order(user.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::get_order_by_number", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn get_order_by_number(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.services.orders.get_order_by_number(user.0, &path).await?;
  Ok(HttpResponse::Ok().json(order))
}

/// The proof image arrives as the raw request body with its `Content-Type`.
#[instrument(
  name = "handler::upload_payment_proof",
  skip(app_state, user, req, body),
  fields(user_id = %user.id(), bytes = body.len())
)]
pub async fn upload_payment_proof(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  req: HttpRequest,
  path: web::Path<Uuid>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let proof = raw_upload(&req, body, "payment-proof");
  let order = app_state
    .services
    .orders
    .upload_payment_proof(user.id(), path.into_inner(), proof)
    .await?;
  info!(order_id = %order.id, "Payment proof received.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "payment proof uploaded, waiting for admin confirmation",
    "order": order
  })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn cancel_order(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .services
    .orders
    .cancel_order(user.id(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::get_order_transaction", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn get_order_transaction(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let transaction = app_state
    .services
    .orders
    .get_transaction(user.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(transaction))
}
