// apps/storefront_app/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use storefront::Identity;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Caller identity taken from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
  pub fn id(&self) -> uuid::Uuid {
    self.0.user_id
  }
}

/// An [`AuthenticatedUser`] whose token carries the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Identity);

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn identify(req: &HttpRequest) -> Result<Identity, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
  let token = bearer_token(req).ok_or_else(|| {
    warn!(path = %req.path(), "Request without bearer token.");
    AppError::Auth("authorization token required".to_string())
  })?;
  state.tokens.identity(token).map_err(|e| AppError::Auth(e.to_string()))
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(identify(req).map(AuthenticatedUser))
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(identify(req).and_then(|identity| {
      identity.require_admin()?;
      Ok(AdminUser(identity))
    }))
  }
}
