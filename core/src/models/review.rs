// core/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub order_id: Uuid,
  pub rating: i32,
  pub comment: String,
  pub is_verified_purchase: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}
