// core/src/services/cart_service.rs

use crate::error::{ShopError, ShopResult};
use crate::models::{CartItem, CartLine, CartView, Product};
use crate::store::{CartStore, ProductStore};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct CartService {
  carts: Arc<dyn CartStore>,
  products: Arc<dyn ProductStore>,
}

/// Loads a product that can still be bought.
pub(crate) async fn purchasable_product(products: &dyn ProductStore, product_id: Uuid) -> ShopResult<Product> {
  let product = products
    .find_product(product_id)
    .await?
    .ok_or_else(|| ShopError::not_found("product not found"))?;
  if !product.is_purchasable() {
    return Err(ShopError::invalid_state("product is not available"));
  }
  Ok(product)
}

impl CartService {
  pub fn new(carts: Arc<dyn CartStore>, products: Arc<dyn ProductStore>) -> Self {
    Self { carts, products }
  }

  #[instrument(name = "cart::add", skip(self))]
  pub async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> ShopResult<CartItem> {
    if quantity <= 0 {
      return Err(ShopError::validation("quantity must be greater than 0"));
    }
    purchasable_product(self.products.as_ref(), product_id).await?;
    let current = self.carts.list_cart(user_id).await?;
    if let Some(line) = current.iter().find(|c| c.product_id == product_id) {
      line
        .quantity
        .checked_add(quantity)
        .ok_or_else(|| ShopError::validation("cart quantity is too large"))?;
    }
    let item = self.carts.add_to_cart(user_id, product_id, quantity).await?;
    debug!(cart_item_id = %item.id, quantity = item.quantity, "Cart line saved.");
    Ok(item)
  }

  /// The caller's cart priced at current product prices. Lines whose product
  /// has since been deleted are left out.
  pub async fn view(&self, user_id: Uuid) -> ShopResult<CartView> {
    let items = self.carts.list_cart(user_id).await?;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
      let Some(product) = self.products.find_product(item.product_id).await? else {
        continue;
      };
      let line_total_cents = product
        .effective_price_cents()
        .checked_mul(i64::from(item.quantity))
        .ok_or_else(|| ShopError::validation("cart total is too large"))?;
      lines.push(CartLine {
        item,
        product,
        line_total_cents,
      });
    }
    let total_cents = lines
      .iter()
      .try_fold(0i64, |acc, l| acc.checked_add(l.line_total_cents))
      .ok_or_else(|| ShopError::validation("cart total is too large"))?;
    Ok(CartView { lines, total_cents })
  }

  async fn owned_item(&self, user_id: Uuid, item_id: Uuid) -> ShopResult<CartItem> {
    let item = self
      .carts
      .find_cart_item(item_id)
      .await?
      .ok_or_else(|| ShopError::not_found("cart item not found"))?;
    if item.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    Ok(item)
  }

  pub async fn update_quantity(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> ShopResult<CartItem> {
    if quantity <= 0 {
      return Err(ShopError::validation("quantity must be greater than 0"));
    }
    let mut item = self.owned_item(user_id, item_id).await?;
    self.carts.update_cart_quantity(item_id, quantity).await?;
    item.quantity = quantity;
    Ok(item)
  }

  pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> ShopResult<()> {
    self.owned_item(user_id, item_id).await?;
    self.carts.remove_cart_item(item_id).await
  }

  pub async fn clear(&self, user_id: Uuid) -> ShopResult<()> {
    self.carts.clear_cart(user_id).await
  }
}
