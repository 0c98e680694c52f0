// apps/storefront_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  #[serde(default = "one")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct QuantityPayload {
  pub quantity: i32,
}

fn one() -> i32 {
  1
}

#[instrument(name = "handler::view_cart", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn view_cart(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let cart = app_state.services.carts.view(user.id()).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, user, body),
  fields(user_id = %user.id(), product_id = %body.product_id, quantity = body.quantity)
)]
pub async fn add_to_cart(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<AddToCartPayload>,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .services
    .carts
    .add(user.id(), body.product_id, body.quantity)
    .await?;
  info!(item_id = %item.id, quantity = item.quantity, "Cart item saved.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "item added to cart",
    "cartItem": item
  })))
}

#[instrument(name = "handler::update_cart_item", skip(app_state, user, body), fields(user_id = %user.id()))]
pub async fn update_cart_item(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<QuantityPayload>,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .services
    .carts
    .update_quantity(user.id(), path.into_inner(), body.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn remove_cart_item(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.carts.remove(user.id(), path.into_inner()).await?;
  Ok(message("item removed from cart"))
}

#[instrument(name = "handler::clear_cart", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn clear_cart(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  app_state.services.carts.clear(user.id()).await?;
  Ok(message("cart cleared"))
}
