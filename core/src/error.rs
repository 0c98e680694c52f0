// core/src/error.rs

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Domain error shared by every service in the crate.
///
/// Variants carry the literal, user-facing message. Callers that surface
/// errors over HTTP map variants to status codes and echo the message.
#[derive(Debug, Error)]
pub enum ShopError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Unauthorized(String),

  /// A state guard rejected the operation (wrong order status, already
  /// cancelled, and so on). Nothing was written.
  #[error("{0}")]
  InvalidState(String),

  #[error("{0}")]
  Validation(String),

  /// A uniqueness constraint or optimistic version check failed.
  #[error("{0}")]
  Conflict(String),

  #[error("storage error: {0}")]
  Storage(#[source] anyhow::Error),

  #[error("workflow error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ShopError {
  pub fn not_found(msg: impl Into<String>) -> Self {
    ShopError::NotFound(msg.into())
  }

  pub fn unauthorized(msg: impl Into<String>) -> Self {
    ShopError::Unauthorized(msg.into())
  }

  pub fn invalid_state(msg: impl Into<String>) -> Self {
    ShopError::InvalidState(msg.into())
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    ShopError::Validation(msg.into())
  }

  pub fn conflict(msg: impl Into<String>) -> Self {
    ShopError::Conflict(msg.into())
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, ShopError::NotFound(_))
  }

  pub fn is_conflict(&self) -> bool {
    matches!(self, ShopError::Conflict(_))
  }
}

impl From<sqlx::Error> for ShopError {
  fn from(err: sqlx::Error) -> Self {
    match &err {
      sqlx::Error::RowNotFound => ShopError::NotFound("record not found".to_string()),
      sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
        ShopError::Conflict(db_err.message().to_string())
      }
      _ => ShopError::Storage(err.into()),
    }
  }
}

impl From<anyhow::Error> for ShopError {
  fn from(err: anyhow::Error) -> Self {
    ShopError::Storage(err)
  }
}

impl From<std::io::Error> for ShopError {
  fn from(err: std::io::Error) -> Self {
    ShopError::Storage(err.into())
  }
}

pub type ShopResult<T, E = ShopError> = std::result::Result<T, E>;
