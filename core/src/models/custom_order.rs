// core/src/models/custom_order.rs

use crate::error::ShopError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "custom_order_status_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CustomOrderStatus {
  #[serde(alias = "submitted")]
  Pending,
  Reviewing,
  Quoted,
  InProgress,
  Completed,
  Cancelled,
}

impl CustomOrderStatus {
  pub fn is_closed(&self) -> bool {
    matches!(self, CustomOrderStatus::Completed | CustomOrderStatus::Cancelled)
  }
}

impl FromStr for CustomOrderStatus {
  type Err = ShopError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" | "submitted" => Ok(CustomOrderStatus::Pending),
      "reviewing" => Ok(CustomOrderStatus::Reviewing),
      "quoted" => Ok(CustomOrderStatus::Quoted),
      "in_progress" => Ok(CustomOrderStatus::InProgress),
      "completed" => Ok(CustomOrderStatus::Completed),
      "cancelled" => Ok(CustomOrderStatus::Cancelled),
      _ => Err(ShopError::validation("invalid custom order status")),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomOrder {
  pub id: Uuid,
  pub order_id: Option<Uuid>,
  pub user_id: Uuid,
  pub title: String,
  pub description: String,
  pub requirements: String,
  pub budget_min_cents: i64,
  pub budget_max_cents: i64,
  pub deadline: Option<DateTime<Utc>>,
  pub status: CustomOrderStatus,
  pub admin_notes: Option<String>,
  pub quote_amount_cents: Option<i64>,
  pub agreed_amount_cents: Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomOrder {
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub requirements: String,
  pub budget_cents: i64,
}

/// Admin processing step for a custom order request.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessCustomOrder {
  pub status: String,
  #[serde(default)]
  pub admin_notes: String,
  pub quote_amount_cents: Option<i64>,
  pub estimated_days: Option<i64>,
}
