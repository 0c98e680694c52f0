// core/src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub description: String,
  pub icon: Option<String>,
  pub parent_id: Option<Uuid>,
  pub sort_order: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

/// Create/update payload. On update, empty strings and `None` leave the
/// stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRequest {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub icon: Option<String>,
  pub parent_id: Option<Uuid>,
  pub sort_order: Option<i32>,
  pub is_active: Option<bool>,
}
