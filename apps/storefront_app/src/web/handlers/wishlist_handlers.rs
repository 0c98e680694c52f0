// apps/storefront_app/src/web/handlers/wishlist_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct WishlistPayload {
  pub product_id: Uuid,
}

#[instrument(name = "handler::list_wishlist", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn list_wishlist(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let items = app_state.services.wishlists.list(user.id()).await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(name = "handler::add_to_wishlist", skip(app_state, user, body), fields(user_id = %user.id(), product_id = %body.product_id))]
pub async fn add_to_wishlist(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<WishlistPayload>,
) -> Result<HttpResponse, AppError> {
  let item = app_state.services.wishlists.add(user.id(), body.product_id).await?;
  Ok(HttpResponse::Created().json(item))
}

#[instrument(name = "handler::remove_from_wishlist", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn remove_from_wishlist(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.wishlists.remove(user.id(), path.into_inner()).await?;
  Ok(message("item removed from wishlist"))
}

#[instrument(name = "handler::clear_wishlist", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn clear_wishlist(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  app_state.services.wishlists.clear(user.id()).await?;
  Ok(message("wishlist cleared"))
}

#[instrument(name = "handler::wishlist_contains", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn wishlist_contains(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let in_wishlist = app_state
    .services
    .wishlists
    .contains(user.id(), path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "in_wishlist": in_wishlist })))
}
