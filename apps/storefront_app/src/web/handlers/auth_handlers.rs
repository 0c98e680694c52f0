// apps/storefront_app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use storefront::services::{LoginRequest, RegisterRequest};
use storefront::ShopError;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::register", skip(app_state, body), fields(email = %body.email))]
pub async fn register(
  app_state: web::Data<AppState>,
  body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
  let auth = app_state.services.users.register(body.into_inner()).await?;
  info!(user_id = %auth.user.id, "User registered.");
  Ok(HttpResponse::Created().json(auth))
}

#[instrument(name = "handler::login", skip(app_state, body), fields(email = %body.email))]
pub async fn login(app_state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
  match app_state.services.users.login(body.into_inner()).await {
    Ok(auth) => Ok(HttpResponse::Ok().json(auth)),
    // Bad credentials are an authentication failure, not a permission one.
    Err(ShopError::Unauthorized(m)) => Err(AppError::Auth(m)),
    Err(e) => Err(e.into()),
  }
}
