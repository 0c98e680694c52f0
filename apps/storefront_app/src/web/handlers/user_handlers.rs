// apps/storefront_app/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storefront::services::ProfileUpdate;
use tracing::instrument;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordPayload {
  pub old_password: String,
  pub new_password: String,
}

#[instrument(name = "handler::get_profile", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn get_profile(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let profile = app_state.services.users.profile(user.id()).await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::update_profile", skip(app_state, user, body), fields(user_id = %user.id()))]
pub async fn update_profile(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
  let profile = app_state
    .services
    .users
    .update_profile(user.id(), body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::change_password", skip(app_state, user, body), fields(user_id = %user.id()))]
pub async fn change_password(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Json<ChangePasswordPayload>,
) -> Result<HttpResponse, AppError> {
  app_state
    .services
    .users
    .change_password(user.id(), &body.old_password, &body.new_password)
    .await?;
  Ok(message("password updated"))
}

#[instrument(name = "handler::delete_account", skip(app_state, user), fields(user_id = %user.id()))]
pub async fn delete_account(app_state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  app_state.services.users.delete_account(user.id()).await?;
  Ok(message("account deleted"))
}
