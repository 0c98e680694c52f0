// core/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_type_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
  SourceCode,
  Pdf,
  Template,
  Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub title: String,
  pub slug: String,
  pub description: String,
  pub category_id: Uuid,
  pub product_type: ProductType,
  pub price_cents: i64,
  pub discount_price_cents: Option<i64>,
  pub preview_images: Vec<String>,
  pub demo_url: Option<String>,
  pub file_url: Option<String>,
  pub tech_stack: Vec<String>,
  pub features: Vec<String>,
  pub requirements: Vec<String>,
  pub downloads_count: i64,
  pub views_count: i64,
  pub rating_average: f64,
  pub is_active: bool,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
  /// The price a buyer pays per unit: the discount price when one is set and
  /// positive, otherwise the list price.
  pub fn effective_price_cents(&self) -> i64 {
    match self.discount_price_cents {
      Some(discount) if discount > 0 => discount,
      _ => self.price_cents,
    }
  }

  pub fn is_purchasable(&self) -> bool {
    self.is_active && self.deleted_at.is_none()
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub category_id: Uuid,
  pub product_type: ProductType,
  pub price_cents: i64,
  pub discount_price_cents: Option<i64>,
  pub demo_url: Option<String>,
  pub file_url: Option<String>,
  #[serde(default)]
  pub tech_stack: Vec<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub requirements: Vec<String>,
  #[serde(default = "default_active")]
  pub is_active: bool,
}

fn default_active() -> bool {
  true
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
  pub title: Option<String>,
  pub description: Option<String>,
  pub category_id: Option<Uuid>,
  pub product_type: Option<ProductType>,
  pub price_cents: Option<i64>,
  pub discount_price_cents: Option<i64>,
  pub demo_url: Option<String>,
  pub file_url: Option<String>,
  pub tech_stack: Option<Vec<String>>,
  pub features: Option<Vec<String>>,
  pub requirements: Option<Vec<String>>,
  pub is_active: Option<bool>,
}

/// Listing filter for the public catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub category_id: Option<Uuid>,
  pub search: Option<String>,
}

impl ProductFilter {
  /// Case-insensitive substring match on title or description.
  pub fn matches(&self, product: &Product) -> bool {
    if let Some(category_id) = self.category_id {
      if product.category_id != category_id {
        return false;
      }
    }
    match self.search.as_deref().map(str::trim) {
      Some(term) if !term.is_empty() => {
        let term = term.to_lowercase();
        product.title.to_lowercase().contains(&term) || product.description.to_lowercase().contains(&term)
      }
      _ => true,
    }
  }
}
