// apps/storefront_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront::ShopError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Shop(#[from] ShopError),

  /// Missing or rejected credentials on the request itself.
  #[error("{0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    AppError::Shop(ShopError::from(err))
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Shop(ShopError::NotFound(_)) => StatusCode::NOT_FOUND,
      AppError::Shop(ShopError::Unauthorized(_)) => StatusCode::FORBIDDEN,
      AppError::Shop(ShopError::InvalidState(_)) | AppError::Shop(ShopError::Validation(_)) => {
        StatusCode::BAD_REQUEST
      }
      AppError::Shop(ShopError::Conflict(_)) => StatusCode::CONFLICT,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Shop(ShopError::Storage(_))
      | AppError::Shop(ShopError::Pipeline(_))
      | AppError::Shop(ShopError::Internal(_))
      | AppError::Config(_)
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = ?self, "Responding with server error");
    } else {
      tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    // Server-side failures are only described in the log above.
    let message = if status.is_server_error() {
      "internal server error".to_string()
    } else {
      self.to_string()
    };
    HttpResponse::build(status).json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn domain_errors_map_to_http_statuses() {
    let cases = [
      (AppError::from(ShopError::not_found("order not found")), 404),
      (AppError::from(ShopError::unauthorized("unauthorized")), 403),
      (AppError::from(ShopError::invalid_state("order is not pending payment")), 400),
      (AppError::from(ShopError::validation("quantity must be greater than 0")), 400),
      (AppError::from(ShopError::conflict("email already registered")), 409),
      (AppError::Auth("missing bearer token".into()), 401),
      (AppError::Config("bad".into()), 500),
      (AppError::Internal("boom".into()), 500),
    ];
    for (err, status) in cases {
      assert_eq!(err.status_code().as_u16(), status, "{}", err);
    }
  }

  async fn body_error(err: AppError) -> String {
    let body = actix_web::body::to_bytes(err.error_response().into_body()).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    value["error"].as_str().unwrap().to_string()
  }

  #[actix_web::test]
  async fn server_errors_do_not_leak_detail() {
    let cases = [
      AppError::from(ShopError::Internal("token signing key rejected".into())),
      AppError::from(ShopError::Storage(anyhow::anyhow!("relation \"orders\" does not exist"))),
      AppError::Internal("jwt secret missing".into()),
      AppError::Config("DATABASE_URL must be set".into()),
    ];
    for err in cases {
      assert_eq!(body_error(err).await, "internal server error");
    }
  }

  #[actix_web::test]
  async fn client_errors_keep_their_message() {
    let err = AppError::from(ShopError::validation("cart total is too large"));
    assert_eq!(body_error(err).await, "cart total is too large");
  }

  #[test]
  fn domain_message_is_echoed_verbatim() {
    let err = AppError::from(ShopError::invalid_state("order is not waiting for confirmation"));
    assert_eq!(err.to_string(), "order is not waiting for confirmation");
  }
}
