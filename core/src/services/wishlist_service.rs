// core/src/services/wishlist_service.rs

use super::cart_service::purchasable_product;
use crate::error::{ShopError, ShopResult};
use crate::models::WishlistItem;
use crate::store::{ProductStore, WishlistStore};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct WishlistService {
  wishlists: Arc<dyn WishlistStore>,
  products: Arc<dyn ProductStore>,
}

impl WishlistService {
  pub fn new(wishlists: Arc<dyn WishlistStore>, products: Arc<dyn ProductStore>) -> Self {
    Self { wishlists, products }
  }

  pub async fn add(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<WishlistItem> {
    purchasable_product(self.products.as_ref(), product_id).await?;
    if self.wishlists.find_wishlist_entry(user_id, product_id).await?.is_some() {
      return Err(ShopError::validation("product already in wishlist"));
    }

    let item = WishlistItem {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      created_at: Utc::now(),
    };
    match self.wishlists.insert_wishlist_item(&item).await {
      Ok(()) => Ok(item),
      Err(ShopError::Conflict(_)) => Err(ShopError::validation("product already in wishlist")),
      Err(e) => Err(e),
    }
  }

  pub async fn list(&self, user_id: Uuid) -> ShopResult<Vec<WishlistItem>> {
    self.wishlists.list_wishlist(user_id).await
  }

  pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> ShopResult<()> {
    let item = self
      .wishlists
      .find_wishlist_item(item_id)
      .await?
      .ok_or_else(|| ShopError::not_found("wishlist item not found"))?;
    if item.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    self.wishlists.remove_wishlist_item(item_id).await
  }

  pub async fn clear(&self, user_id: Uuid) -> ShopResult<()> {
    self.wishlists.clear_wishlist(user_id).await
  }

  pub async fn contains(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<bool> {
    Ok(self.wishlists.find_wishlist_entry(user_id, product_id).await?.is_some())
  }
}
