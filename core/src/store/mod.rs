// core/src/store/mod.rs

//! Persistence seams.
//!
//! Each collaborator gets its own trait so services only depend on what they
//! touch. [`MemoryStore`] and [`PgStore`] implement all of them.
//!
//! Finder methods return `Ok(None)` for missing or soft-deleted rows; the
//! calling service decides which `NotFound` message to surface.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::ShopResult;
use crate::models::{
  ApiLog, CartItem, Category, CustomOrder, CustomOrderStatus, Download, Notification, Order, OrderStatus, Page,
  PageRequest, Product, ProductFilter, Review, Transaction, TransactionStatus, User, WishlistItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Conflict` when the email is taken.
  async fn insert_user(&self, user: &User) -> ShopResult<()>;
  async fn find_user(&self, id: Uuid) -> ShopResult<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>>;
  async fn update_user(&self, user: &User) -> ShopResult<()>;
  async fn soft_delete_user(&self, id: Uuid) -> ShopResult<()>;
  async fn list_users(&self, page: PageRequest) -> ShopResult<Page<User>>;
  async fn all_users(&self) -> ShopResult<Vec<User>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
  async fn insert_category(&self, category: &Category) -> ShopResult<()>;
  async fn find_category(&self, id: Uuid) -> ShopResult<Option<Category>>;
  async fn find_category_by_slug(&self, slug: &str) -> ShopResult<Option<Category>>;
  async fn list_categories(&self) -> ShopResult<Vec<Category>>;
  async fn update_category(&self, category: &Category) -> ShopResult<()>;
  async fn soft_delete_category(&self, id: Uuid) -> ShopResult<()>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn insert_product(&self, product: &Product) -> ShopResult<()>;
  /// Includes inactive products; excludes soft-deleted ones.
  async fn find_product(&self, id: Uuid) -> ShopResult<Option<Product>>;
  async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>>;
  /// Active products only, newest first.
  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> ShopResult<Page<Product>>;
  async fn update_product(&self, product: &Product) -> ShopResult<()>;
  async fn soft_delete_product(&self, id: Uuid) -> ShopResult<()>;
  async fn increment_product_views(&self, id: Uuid) -> ShopResult<()>;
  async fn increment_product_downloads(&self, id: Uuid) -> ShopResult<()>;
  async fn set_product_rating(&self, id: Uuid, rating_average: f64) -> ShopResult<()>;
  async fn all_products(&self) -> ShopResult<Vec<Product>>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// Inserts a line or adds `quantity` to the existing line for the same
  /// (user, product) pair.
  async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> ShopResult<CartItem>;
  async fn find_cart_item(&self, id: Uuid) -> ShopResult<Option<CartItem>>;
  async fn list_cart(&self, user_id: Uuid) -> ShopResult<Vec<CartItem>>;
  async fn update_cart_quantity(&self, id: Uuid, quantity: i32) -> ShopResult<()>;
  async fn remove_cart_item(&self, id: Uuid) -> ShopResult<()>;
  async fn clear_cart(&self, user_id: Uuid) -> ShopResult<()>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
  /// Fails with `Conflict` when the pair already exists.
  async fn insert_wishlist_item(&self, item: &WishlistItem) -> ShopResult<()>;
  async fn find_wishlist_item(&self, id: Uuid) -> ShopResult<Option<WishlistItem>>;
  async fn find_wishlist_entry(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<WishlistItem>>;
  async fn list_wishlist(&self, user_id: Uuid) -> ShopResult<Vec<WishlistItem>>;
  async fn remove_wishlist_item(&self, id: Uuid) -> ShopResult<()>;
  async fn clear_wishlist(&self, user_id: Uuid) -> ShopResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists an order and its transaction as one unit. A `Conflict` means
  /// the order or transaction number is already taken and nothing was written.
  async fn create_order(&self, order: &Order, transaction: &Transaction) -> ShopResult<()>;
  async fn find_order(&self, id: Uuid) -> ShopResult<Option<Order>>;
  async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>>;
  async fn find_transaction_for_order(&self, order_id: Uuid) -> ShopResult<Option<Transaction>>;
  /// Writes `order` and `transaction` together iff the stored order version
  /// still equals `expected_version`, and returns the order with its bumped
  /// version. Fails with `Conflict` when another writer got there first.
  async fn save_transition(&self, order: &Order, transaction: &Transaction, expected_version: i32)
    -> ShopResult<Order>;
  async fn list_user_orders(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Order>>;
  async fn list_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> ShopResult<Page<Order>>;
  async fn all_orders(&self) -> ShopResult<Vec<Order>>;
  /// Some order of `user_id` for `product_id` with `payment_status = paid`.
  async fn find_paid_order(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<Order>>;
  async fn list_transactions(
    &self,
    page: PageRequest,
    status: Option<TransactionStatus>,
  ) -> ShopResult<Page<Transaction>>;
}

#[async_trait]
pub trait DownloadStore: Send + Sync {
  async fn insert_download(&self, download: &Download) -> ShopResult<()>;
  async fn list_user_downloads(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Download>>;
  async fn download_history(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Vec<Download>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
  async fn insert_review(&self, review: &Review) -> ShopResult<()>;
  async fn find_review(&self, id: Uuid) -> ShopResult<Option<Review>>;
  async fn update_review(&self, review: &Review) -> ShopResult<()>;
  async fn soft_delete_review(&self, id: Uuid) -> ShopResult<()>;
  async fn list_product_reviews(&self, product_id: Uuid, page: PageRequest) -> ShopResult<Page<Review>>;
  async fn list_user_reviews(&self, user_id: Uuid) -> ShopResult<Vec<Review>>;
  /// 0.0 when the product has no reviews.
  async fn average_rating(&self, product_id: Uuid) -> ShopResult<f64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
  async fn insert_notification(&self, notification: &Notification) -> ShopResult<()>;
  async fn find_notification(&self, id: Uuid) -> ShopResult<Option<Notification>>;
  async fn list_notifications(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Notification>>;
  async fn list_unread(&self, user_id: Uuid) -> ShopResult<Vec<Notification>>;
  async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> ShopResult<()>;
  /// Returns how many notifications changed.
  async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> ShopResult<u64>;
  async fn soft_delete_notification(&self, id: Uuid) -> ShopResult<()>;
}

#[async_trait]
pub trait CustomOrderStore: Send + Sync {
  async fn insert_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()>;
  async fn find_custom_order(&self, id: Uuid) -> ShopResult<Option<CustomOrder>>;
  async fn update_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()>;
  async fn list_user_custom_orders(&self, user_id: Uuid) -> ShopResult<Vec<CustomOrder>>;
  async fn list_custom_orders(
    &self,
    page: PageRequest,
    status: Option<CustomOrderStatus>,
  ) -> ShopResult<Page<CustomOrder>>;
}

#[async_trait]
pub trait ApiLogStore: Send + Sync {
  async fn insert_api_log(&self, entry: &ApiLog) -> ShopResult<()>;
}

/// Everything a full backend needs, in one object.
pub trait Store:
  UserStore
  + CategoryStore
  + ProductStore
  + CartStore
  + WishlistStore
  + OrderStore
  + DownloadStore
  + ReviewStore
  + NotificationStore
  + CustomOrderStore
  + ApiLogStore
{
}

impl<T> Store for T where
  T: UserStore
    + CategoryStore
    + ProductStore
    + CartStore
    + WishlistStore
    + OrderStore
    + DownloadStore
    + ReviewStore
    + NotificationStore
    + CustomOrderStore
    + ApiLogStore
{
}
