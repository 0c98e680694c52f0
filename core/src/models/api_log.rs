// core/src/models/api_log.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One served HTTP request, as written by the access-log task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiLog {
  pub id: Uuid,
  pub user_id: Option<Uuid>,
  pub method: String,
  pub endpoint: String,
  pub status_code: i32,
  pub response_time_ms: i64,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
  pub error_message: Option<String>,
  pub created_at: DateTime<Utc>,
}
