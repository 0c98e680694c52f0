// core/src/store/memory.rs

//! In-process store backed by hash maps behind one `parking_lot` mutex.
//!
//! Every trait method takes the lock once, so multi-row writes such as
//! `create_order` and `save_transition` are atomic with respect to each other.

use super::{
  ApiLogStore, CartStore, CategoryStore, CustomOrderStore, DownloadStore, NotificationStore, OrderStore,
  ProductStore, ReviewStore, UserStore, WishlistStore,
};
use crate::error::{ShopError, ShopResult};
use crate::models::{
  ApiLog, CartItem, Category, CustomOrder, CustomOrderStatus, Download, Notification, Order, OrderStatus, Page,
  PageRequest, PaymentStatus, Product, ProductFilter, Review, Transaction, TransactionStatus, User, WishlistItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
  users: HashMap<Uuid, User>,
  categories: HashMap<Uuid, Category>,
  products: HashMap<Uuid, Product>,
  cart: HashMap<Uuid, CartItem>,
  wishlist: HashMap<Uuid, WishlistItem>,
  orders: HashMap<Uuid, Order>,
  // Keyed by order id; one transaction per order.
  transactions: HashMap<Uuid, Transaction>,
  downloads: Vec<Download>,
  reviews: HashMap<Uuid, Review>,
  notifications: HashMap<Uuid, Notification>,
  custom_orders: HashMap<Uuid, CustomOrder>,
  api_logs: Vec<ApiLog>,
}

#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<MemoryState>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of every access-log entry written so far.
  pub fn api_logs(&self) -> Vec<ApiLog> {
    self.state.lock().api_logs.clone()
  }
}

fn page_of<T: Clone>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>, page: PageRequest) -> Page<T> {
  rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
  let total = rows.len() as i64;
  Page::new(page.slice(&rows), total, page)
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
  rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
  rows
}

fn missing(what: &str) -> ShopError {
  ShopError::not_found(format!("{} not found", what))
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn insert_user(&self, user: &User) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .users
      .values()
      .any(|u| u.deleted_at.is_none() && u.email.eq_ignore_ascii_case(&user.email))
    {
      return Err(ShopError::conflict("email already registered"));
    }
    state.users.insert(user.id, user.clone());
    Ok(())
  }

  async fn find_user(&self, id: Uuid) -> ShopResult<Option<User>> {
    let state = self.state.lock();
    Ok(state.users.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>> {
    let state = self.state.lock();
    Ok(
      state
        .users
        .values()
        .find(|u| u.deleted_at.is_none() && u.email.eq_ignore_ascii_case(email))
        .cloned(),
    )
  }

  async fn update_user(&self, user: &User) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .users
      .values()
      .any(|u| u.id != user.id && u.deleted_at.is_none() && u.email.eq_ignore_ascii_case(&user.email))
    {
      return Err(ShopError::conflict("email already registered"));
    }
    match state.users.get_mut(&user.id) {
      Some(stored) => {
        *stored = user.clone();
        Ok(())
      }
      None => Err(missing("user")),
    }
  }

  async fn soft_delete_user(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let user = state.users.get_mut(&id).ok_or_else(|| missing("user"))?;
    user.deleted_at = Some(Utc::now());
    Ok(())
  }

  async fn list_users(&self, page: PageRequest) -> ShopResult<Page<User>> {
    let state = self.state.lock();
    let rows = state.users.values().filter(|u| u.deleted_at.is_none()).cloned().collect();
    Ok(page_of(rows, |u: &User| u.created_at, page))
  }

  async fn all_users(&self) -> ShopResult<Vec<User>> {
    let state = self.state.lock();
    Ok(state.users.values().filter(|u| u.deleted_at.is_none()).cloned().collect())
  }
}

#[async_trait]
impl CategoryStore for MemoryStore {
  async fn insert_category(&self, category: &Category) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .categories
      .values()
      .any(|c| c.deleted_at.is_none() && c.slug == category.slug)
    {
      return Err(ShopError::conflict("category slug already exists"));
    }
    state.categories.insert(category.id, category.clone());
    Ok(())
  }

  async fn find_category(&self, id: Uuid) -> ShopResult<Option<Category>> {
    let state = self.state.lock();
    Ok(state.categories.get(&id).filter(|c| c.deleted_at.is_none()).cloned())
  }

  async fn find_category_by_slug(&self, slug: &str) -> ShopResult<Option<Category>> {
    let state = self.state.lock();
    Ok(
      state
        .categories
        .values()
        .find(|c| c.deleted_at.is_none() && c.slug == slug)
        .cloned(),
    )
  }

  async fn list_categories(&self) -> ShopResult<Vec<Category>> {
    let state = self.state.lock();
    let mut rows: Vec<Category> = state
      .categories
      .values()
      .filter(|c| c.deleted_at.is_none())
      .cloned()
      .collect();
    rows.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    Ok(rows)
  }

  async fn update_category(&self, category: &Category) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .categories
      .values()
      .any(|c| c.id != category.id && c.deleted_at.is_none() && c.slug == category.slug)
    {
      return Err(ShopError::conflict("category slug already exists"));
    }
    let stored = state.categories.get_mut(&category.id).ok_or_else(|| missing("category"))?;
    *stored = category.clone();
    Ok(())
  }

  async fn soft_delete_category(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let category = state.categories.get_mut(&id).ok_or_else(|| missing("category"))?;
    category.deleted_at = Some(Utc::now());
    Ok(())
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn insert_product(&self, product: &Product) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .products
      .values()
      .any(|p| p.deleted_at.is_none() && p.slug == product.slug)
    {
      return Err(ShopError::conflict("product slug already exists"));
    }
    state.products.insert(product.id, product.clone());
    Ok(())
  }

  async fn find_product(&self, id: Uuid) -> ShopResult<Option<Product>> {
    let state = self.state.lock();
    Ok(state.products.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
  }

  async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>> {
    let state = self.state.lock();
    Ok(
      state
        .products
        .values()
        .find(|p| p.deleted_at.is_none() && p.slug == slug)
        .cloned(),
    )
  }

  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> ShopResult<Page<Product>> {
    let state = self.state.lock();
    let rows = state
      .products
      .values()
      .filter(|p| p.is_purchasable() && filter.matches(p))
      .cloned()
      .collect();
    Ok(page_of(rows, |p: &Product| p.created_at, page))
  }

  async fn update_product(&self, product: &Product) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .products
      .values()
      .any(|p| p.id != product.id && p.deleted_at.is_none() && p.slug == product.slug)
    {
      return Err(ShopError::conflict("product slug already exists"));
    }
    let stored = state.products.get_mut(&product.id).ok_or_else(|| missing("product"))?;
    *stored = product.clone();
    Ok(())
  }

  async fn soft_delete_product(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let product = state.products.get_mut(&id).ok_or_else(|| missing("product"))?;
    product.deleted_at = Some(Utc::now());
    Ok(())
  }

  async fn increment_product_views(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let product = state.products.get_mut(&id).ok_or_else(|| missing("product"))?;
    product.views_count += 1;
    Ok(())
  }

  async fn increment_product_downloads(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let product = state.products.get_mut(&id).ok_or_else(|| missing("product"))?;
    product.downloads_count += 1;
    Ok(())
  }

  async fn set_product_rating(&self, id: Uuid, rating_average: f64) -> ShopResult<()> {
    let mut state = self.state.lock();
    let product = state.products.get_mut(&id).ok_or_else(|| missing("product"))?;
    product.rating_average = rating_average;
    Ok(())
  }

  async fn all_products(&self) -> ShopResult<Vec<Product>> {
    let state = self.state.lock();
    Ok(state.products.values().filter(|p| p.deleted_at.is_none()).cloned().collect())
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> ShopResult<CartItem> {
    let mut state = self.state.lock();
    let now = Utc::now();
    if let Some(existing) = state
      .cart
      .values_mut()
      .find(|c| c.user_id == user_id && c.product_id == product_id)
    {
      existing.quantity = existing
        .quantity
        .checked_add(quantity)
        .ok_or_else(|| ShopError::validation("cart quantity is too large"))?;
      existing.updated_at = now;
      return Ok(existing.clone());
    }
    let item = CartItem {
      id: Uuid::new_v4(),
      user_id,
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    };
    state.cart.insert(item.id, item.clone());
    Ok(item)
  }

  async fn find_cart_item(&self, id: Uuid) -> ShopResult<Option<CartItem>> {
    Ok(self.state.lock().cart.get(&id).cloned())
  }

  async fn list_cart(&self, user_id: Uuid) -> ShopResult<Vec<CartItem>> {
    let state = self.state.lock();
    let rows = state.cart.values().filter(|c| c.user_id == user_id).cloned().collect();
    Ok(newest_first(rows, |c: &CartItem| c.created_at))
  }

  async fn update_cart_quantity(&self, id: Uuid, quantity: i32) -> ShopResult<()> {
    let mut state = self.state.lock();
    let item = state.cart.get_mut(&id).ok_or_else(|| missing("cart item"))?;
    item.quantity = quantity;
    item.updated_at = Utc::now();
    Ok(())
  }

  async fn remove_cart_item(&self, id: Uuid) -> ShopResult<()> {
    self.state.lock().cart.remove(&id);
    Ok(())
  }

  async fn clear_cart(&self, user_id: Uuid) -> ShopResult<()> {
    self.state.lock().cart.retain(|_, c| c.user_id != user_id);
    Ok(())
  }
}

#[async_trait]
impl WishlistStore for MemoryStore {
  async fn insert_wishlist_item(&self, item: &WishlistItem) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state
      .wishlist
      .values()
      .any(|w| w.user_id == item.user_id && w.product_id == item.product_id)
    {
      return Err(ShopError::conflict("product already in wishlist"));
    }
    state.wishlist.insert(item.id, item.clone());
    Ok(())
  }

  async fn find_wishlist_item(&self, id: Uuid) -> ShopResult<Option<WishlistItem>> {
    Ok(self.state.lock().wishlist.get(&id).cloned())
  }

  async fn find_wishlist_entry(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<WishlistItem>> {
    let state = self.state.lock();
    Ok(
      state
        .wishlist
        .values()
        .find(|w| w.user_id == user_id && w.product_id == product_id)
        .cloned(),
    )
  }

  async fn list_wishlist(&self, user_id: Uuid) -> ShopResult<Vec<WishlistItem>> {
    let state = self.state.lock();
    let rows = state.wishlist.values().filter(|w| w.user_id == user_id).cloned().collect();
    Ok(newest_first(rows, |w: &WishlistItem| w.created_at))
  }

  async fn remove_wishlist_item(&self, id: Uuid) -> ShopResult<()> {
    self.state.lock().wishlist.remove(&id);
    Ok(())
  }

  async fn clear_wishlist(&self, user_id: Uuid) -> ShopResult<()> {
    self.state.lock().wishlist.retain(|_, w| w.user_id != user_id);
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create_order(&self, order: &Order, transaction: &Transaction) -> ShopResult<()> {
    let mut state = self.state.lock();
    if state.orders.values().any(|o| o.order_number == order.order_number) {
      return Err(ShopError::conflict("order number already exists"));
    }
    if state
      .transactions
      .values()
      .any(|t| t.transaction_number == transaction.transaction_number)
    {
      return Err(ShopError::conflict("transaction number already exists"));
    }
    if state.transactions.contains_key(&order.id) {
      return Err(ShopError::conflict("order already has a transaction"));
    }
    state.orders.insert(order.id, order.clone());
    state.transactions.insert(order.id, transaction.clone());
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> ShopResult<Option<Order>> {
    let state = self.state.lock();
    Ok(state.orders.get(&id).filter(|o| o.deleted_at.is_none()).cloned())
  }

  async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .values()
        .find(|o| o.deleted_at.is_none() && o.order_number == order_number)
        .cloned(),
    )
  }

  async fn find_transaction_for_order(&self, order_id: Uuid) -> ShopResult<Option<Transaction>> {
    Ok(self.state.lock().transactions.get(&order_id).cloned())
  }

  async fn save_transition(
    &self,
    order: &Order,
    transaction: &Transaction,
    expected_version: i32,
  ) -> ShopResult<Order> {
    let mut state = self.state.lock();
    let stored = state.orders.get(&order.id).ok_or_else(|| missing("order"))?;
    if stored.version != expected_version {
      return Err(ShopError::conflict("order was modified concurrently"));
    }
    if !state.transactions.contains_key(&order.id) {
      return Err(missing("transaction"));
    }
    let mut saved = order.clone();
    saved.version = expected_version + 1;
    state.orders.insert(saved.id, saved.clone());
    state.transactions.insert(order.id, transaction.clone());
    Ok(saved)
  }

  async fn list_user_orders(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Order>> {
    let state = self.state.lock();
    let rows = state
      .orders
      .values()
      .filter(|o| o.deleted_at.is_none() && o.user_id == user_id)
      .cloned()
      .collect();
    Ok(page_of(rows, |o: &Order| o.created_at, page))
  }

  async fn list_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> ShopResult<Page<Order>> {
    let state = self.state.lock();
    let rows = state
      .orders
      .values()
      .filter(|o| o.deleted_at.is_none() && status.map_or(true, |s| o.status == s))
      .cloned()
      .collect();
    Ok(page_of(rows, |o: &Order| o.created_at, page))
  }

  async fn all_orders(&self) -> ShopResult<Vec<Order>> {
    let state = self.state.lock();
    Ok(state.orders.values().filter(|o| o.deleted_at.is_none()).cloned().collect())
  }

  async fn find_paid_order(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<Order>> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .values()
        .find(|o| {
          o.deleted_at.is_none()
            && o.user_id == user_id
            && o.product_id == Some(product_id)
            && o.payment_status == PaymentStatus::Paid
        })
        .cloned(),
    )
  }

  async fn list_transactions(
    &self,
    page: PageRequest,
    status: Option<TransactionStatus>,
  ) -> ShopResult<Page<Transaction>> {
    let state = self.state.lock();
    let rows = state
      .transactions
      .values()
      .filter(|t| status.map_or(true, |s| t.status == s))
      .cloned()
      .collect();
    Ok(page_of(rows, |t: &Transaction| t.created_at, page))
  }
}

#[async_trait]
impl DownloadStore for MemoryStore {
  async fn insert_download(&self, download: &Download) -> ShopResult<()> {
    self.state.lock().downloads.push(download.clone());
    Ok(())
  }

  async fn list_user_downloads(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Download>> {
    let state = self.state.lock();
    let rows = state.downloads.iter().filter(|d| d.user_id == user_id).cloned().collect();
    Ok(page_of(rows, |d: &Download| d.created_at, page))
  }

  async fn download_history(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Vec<Download>> {
    let state = self.state.lock();
    let rows = state
      .downloads
      .iter()
      .filter(|d| d.user_id == user_id && d.product_id == product_id)
      .cloned()
      .collect();
    Ok(newest_first(rows, |d: &Download| d.created_at))
  }
}

#[async_trait]
impl ReviewStore for MemoryStore {
  async fn insert_review(&self, review: &Review) -> ShopResult<()> {
    self.state.lock().reviews.insert(review.id, review.clone());
    Ok(())
  }

  async fn find_review(&self, id: Uuid) -> ShopResult<Option<Review>> {
    let state = self.state.lock();
    Ok(state.reviews.get(&id).filter(|r| r.deleted_at.is_none()).cloned())
  }

  async fn update_review(&self, review: &Review) -> ShopResult<()> {
    let mut state = self.state.lock();
    let stored = state.reviews.get_mut(&review.id).ok_or_else(|| missing("review"))?;
    *stored = review.clone();
    Ok(())
  }

  async fn soft_delete_review(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let review = state.reviews.get_mut(&id).ok_or_else(|| missing("review"))?;
    review.deleted_at = Some(Utc::now());
    Ok(())
  }

  async fn list_product_reviews(&self, product_id: Uuid, page: PageRequest) -> ShopResult<Page<Review>> {
    let state = self.state.lock();
    let rows = state
      .reviews
      .values()
      .filter(|r| r.deleted_at.is_none() && r.product_id == product_id)
      .cloned()
      .collect();
    Ok(page_of(rows, |r: &Review| r.created_at, page))
  }

  async fn list_user_reviews(&self, user_id: Uuid) -> ShopResult<Vec<Review>> {
    let state = self.state.lock();
    let rows = state
      .reviews
      .values()
      .filter(|r| r.deleted_at.is_none() && r.user_id == user_id)
      .cloned()
      .collect();
    Ok(newest_first(rows, |r: &Review| r.created_at))
  }

  async fn average_rating(&self, product_id: Uuid) -> ShopResult<f64> {
    let state = self.state.lock();
    let ratings: Vec<i32> = state
      .reviews
      .values()
      .filter(|r| r.deleted_at.is_none() && r.product_id == product_id)
      .map(|r| r.rating)
      .collect();
    if ratings.is_empty() {
      return Ok(0.0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    Ok(sum as f64 / ratings.len() as f64)
  }
}

#[async_trait]
impl NotificationStore for MemoryStore {
  async fn insert_notification(&self, notification: &Notification) -> ShopResult<()> {
    self
      .state
      .lock()
      .notifications
      .insert(notification.id, notification.clone());
    Ok(())
  }

  async fn find_notification(&self, id: Uuid) -> ShopResult<Option<Notification>> {
    let state = self.state.lock();
    Ok(state.notifications.get(&id).filter(|n| n.deleted_at.is_none()).cloned())
  }

  async fn list_notifications(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Notification>> {
    let state = self.state.lock();
    let rows = state
      .notifications
      .values()
      .filter(|n| n.deleted_at.is_none() && n.user_id == user_id)
      .cloned()
      .collect();
    Ok(page_of(rows, |n: &Notification| n.created_at, page))
  }

  async fn list_unread(&self, user_id: Uuid) -> ShopResult<Vec<Notification>> {
    let state = self.state.lock();
    let rows = state
      .notifications
      .values()
      .filter(|n| n.deleted_at.is_none() && n.user_id == user_id && !n.is_read)
      .cloned()
      .collect();
    Ok(newest_first(rows, |n: &Notification| n.created_at))
  }

  async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> ShopResult<()> {
    let mut state = self.state.lock();
    let notification = state.notifications.get_mut(&id).ok_or_else(|| missing("notification"))?;
    notification.is_read = true;
    notification.read_at = Some(at);
    Ok(())
  }

  async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> ShopResult<u64> {
    let mut state = self.state.lock();
    let mut changed = 0;
    for n in state
      .notifications
      .values_mut()
      .filter(|n| n.deleted_at.is_none() && n.user_id == user_id && !n.is_read)
    {
      n.is_read = true;
      n.read_at = Some(at);
      changed += 1;
    }
    Ok(changed)
  }

  async fn soft_delete_notification(&self, id: Uuid) -> ShopResult<()> {
    let mut state = self.state.lock();
    let notification = state.notifications.get_mut(&id).ok_or_else(|| missing("notification"))?;
    notification.deleted_at = Some(Utc::now());
    Ok(())
  }
}

#[async_trait]
impl CustomOrderStore for MemoryStore {
  async fn insert_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()> {
    self
      .state
      .lock()
      .custom_orders
      .insert(custom_order.id, custom_order.clone());
    Ok(())
  }

  async fn find_custom_order(&self, id: Uuid) -> ShopResult<Option<CustomOrder>> {
    let state = self.state.lock();
    Ok(state.custom_orders.get(&id).filter(|c| c.deleted_at.is_none()).cloned())
  }

  async fn update_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()> {
    let mut state = self.state.lock();
    let stored = state
      .custom_orders
      .get_mut(&custom_order.id)
      .ok_or_else(|| missing("custom order"))?;
    *stored = custom_order.clone();
    Ok(())
  }

  async fn list_user_custom_orders(&self, user_id: Uuid) -> ShopResult<Vec<CustomOrder>> {
    let state = self.state.lock();
    let rows = state
      .custom_orders
      .values()
      .filter(|c| c.deleted_at.is_none() && c.user_id == user_id)
      .cloned()
      .collect();
    Ok(newest_first(rows, |c: &CustomOrder| c.created_at))
  }

  async fn list_custom_orders(
    &self,
    page: PageRequest,
    status: Option<CustomOrderStatus>,
  ) -> ShopResult<Page<CustomOrder>> {
    let state = self.state.lock();
    let rows = state
      .custom_orders
      .values()
      .filter(|c| c.deleted_at.is_none() && status.map_or(true, |s| c.status == s))
      .cloned()
      .collect();
    Ok(page_of(rows, |c: &CustomOrder| c.created_at, page))
  }
}

#[async_trait]
impl ApiLogStore for MemoryStore {
  async fn insert_api_log(&self, entry: &ApiLog) -> ShopResult<()> {
    self.state.lock().api_logs.push(entry.clone());
    Ok(())
  }
}
