// core/src/models/download.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A download grant. Append-only; one row per granted access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Download {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub order_id: Uuid,
  pub download_token: String,
  pub expires_at: DateTime<Utc>,
  pub is_used: bool,
  pub downloaded_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}
