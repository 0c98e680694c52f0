// core/src/models/wishlist.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WishlistItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub created_at: DateTime<Utc>,
}
