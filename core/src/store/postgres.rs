// core/src/store/postgres.rs

//! Postgres-backed store using runtime-checked `sqlx` queries.

use super::{
  ApiLogStore, CartStore, CategoryStore, CustomOrderStore, DownloadStore, NotificationStore, OrderStore,
  ProductStore, ReviewStore, UserStore, WishlistStore,
};
use crate::error::{ShopError, ShopResult};
use crate::models::{
  ApiLog, CartItem, Category, CustomOrder, CustomOrderStatus, Download, Notification, Order, OrderStatus, Page,
  PageRequest, Product, ProductFilter, Review, Transaction, TransactionStatus, User, WishlistItem,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, provider, provider_id, avatar_url, is_verified, \
  created_at, updated_at, deleted_at";

const CATEGORY_COLUMNS: &str =
  "id, name, slug, description, icon, parent_id, sort_order, is_active, created_at, updated_at, deleted_at";

const PRODUCT_COLUMNS: &str = "id, title, slug, description, category_id, product_type, price_cents, \
  discount_price_cents, preview_images, demo_url, file_url, tech_stack, features, requirements, downloads_count, \
  views_count, rating_average, is_active, created_by, created_at, updated_at, deleted_at";

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

const WISHLIST_COLUMNS: &str = "id, user_id, product_id, created_at";

const ORDER_COLUMNS: &str = "id, order_number, user_id, product_id, order_type, status, payment_status, quantity, \
  total_amount_cents, discount_amount_cents, final_amount_cents, payment_method, notes, version, created_at, \
  updated_at, deleted_at";

const TRANSACTION_COLUMNS: &str = "id, order_id, user_id, transaction_number, amount_cents, payment_method, \
  payment_gateway, payment_gateway_ref, status, paid_at, metadata, created_at, updated_at";

const DOWNLOAD_COLUMNS: &str =
  "id, user_id, product_id, order_id, download_token, expires_at, is_used, downloaded_at, created_at";

const REVIEW_COLUMNS: &str =
  "id, user_id, product_id, order_id, rating, comment, is_verified_purchase, created_at, updated_at, deleted_at";

const NOTIFICATION_COLUMNS: &str =
  "id, user_id, kind, title, message, action_url, is_read, read_at, created_at, deleted_at";

const CUSTOM_ORDER_COLUMNS: &str = "id, order_id, user_id, title, description, requirements, budget_min_cents, \
  budget_max_cents, deadline, status, admin_notes, quote_amount_cents, agreed_amount_cents, created_at, updated_at, \
  deleted_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

fn ensure_affected(rows: u64, what: &str) -> ShopResult<()> {
  if rows == 0 {
    return Err(ShopError::not_found(format!("{} not found", what)));
  }
  Ok(())
}

fn like_pattern(term: &str) -> String {
  let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

#[async_trait]
impl UserStore for PgStore {
  async fn insert_user(&self, user: &User) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO users (id, email, password_hash, name, role, provider, provider_id, avatar_url, is_verified, \
       created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role)
    .bind(user.provider)
    .bind(&user.provider_id)
    .bind(&user.avatar_url)
    .bind(user.is_verified)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| match ShopError::from(e) {
      ShopError::Conflict(_) => ShopError::conflict("email already registered"),
      other => other,
    })?;
    Ok(())
  }

  async fn find_user(&self, id: Uuid) -> ShopResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>> {
    let sql = format!(
      "SELECT {} FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
      USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
  }

  async fn update_user(&self, user: &User) -> ShopResult<()> {
    let result = sqlx::query(
      "UPDATE users SET email = $2, password_hash = $3, name = $4, role = $5, provider = $6, provider_id = $7, \
       avatar_url = $8, is_verified = $9, updated_at = $10 WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role)
    .bind(user.provider)
    .bind(&user.provider_id)
    .bind(&user.avatar_url)
    .bind(user.is_verified)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| match ShopError::from(e) {
      ShopError::Conflict(_) => ShopError::conflict("email already registered"),
      other => other,
    })?;
    ensure_affected(result.rows_affected(), "user")
  }

  async fn soft_delete_user(&self, id: Uuid) -> ShopResult<()> {
    let result = sqlx::query("UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(id)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "user")
  }

  async fn list_users(&self, page: PageRequest) -> ShopResult<Page<User>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM users WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT $1 OFFSET $2",
      USER_COLUMNS
    );
    let items = sqlx::query_as::<_, User>(&sql)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn all_users(&self) -> ShopResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users WHERE deleted_at IS NULL", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
  }
}

#[async_trait]
impl CategoryStore for PgStore {
  async fn insert_category(&self, category: &Category) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO categories (id, name, slug, description, icon, parent_id, sort_order, is_active, created_at, \
       updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon)
    .bind(category.parent_id)
    .bind(category.sort_order)
    .bind(category.is_active)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_category(&self, id: Uuid) -> ShopResult<Option<Category>> {
    let sql = format!(
      "SELECT {} FROM categories WHERE id = $1 AND deleted_at IS NULL",
      CATEGORY_COLUMNS
    );
    Ok(sqlx::query_as::<_, Category>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_category_by_slug(&self, slug: &str) -> ShopResult<Option<Category>> {
    let sql = format!(
      "SELECT {} FROM categories WHERE slug = $1 AND deleted_at IS NULL",
      CATEGORY_COLUMNS
    );
    Ok(sqlx::query_as::<_, Category>(&sql).bind(slug).fetch_optional(&self.pool).await?)
  }

  async fn list_categories(&self) -> ShopResult<Vec<Category>> {
    let sql = format!(
      "SELECT {} FROM categories WHERE deleted_at IS NULL ORDER BY sort_order, name",
      CATEGORY_COLUMNS
    );
    Ok(sqlx::query_as::<_, Category>(&sql).fetch_all(&self.pool).await?)
  }

  async fn update_category(&self, category: &Category) -> ShopResult<()> {
    let result = sqlx::query(
      "UPDATE categories SET name = $2, slug = $3, description = $4, icon = $5, parent_id = $6, sort_order = $7, \
       is_active = $8, updated_at = $9 WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.icon)
    .bind(category.parent_id)
    .bind(category.sort_order)
    .bind(category.is_active)
    .bind(category.updated_at)
    .execute(&self.pool)
    .await?;
    ensure_affected(result.rows_affected(), "category")
  }

  async fn soft_delete_category(&self, id: Uuid) -> ShopResult<()> {
    let result = sqlx::query("UPDATE categories SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(id)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "category")
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn insert_product(&self, product: &Product) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO products (id, title, slug, description, category_id, product_type, price_cents, \
       discount_price_cents, preview_images, demo_url, file_url, tech_stack, features, requirements, \
       downloads_count, views_count, rating_average, is_active, created_by, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
    )
    .bind(product.id)
    .bind(&product.title)
    .bind(&product.slug)
    .bind(&product.description)
    .bind(product.category_id)
    .bind(product.product_type)
    .bind(product.price_cents)
    .bind(product.discount_price_cents)
    .bind(&product.preview_images)
    .bind(&product.demo_url)
    .bind(&product.file_url)
    .bind(&product.tech_stack)
    .bind(&product.features)
    .bind(&product.requirements)
    .bind(product.downloads_count)
    .bind(product.views_count)
    .bind(product.rating_average)
    .bind(product.is_active)
    .bind(product.created_by)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_product(&self, id: Uuid) -> ShopResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1 AND deleted_at IS NULL", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_product_by_slug(&self, slug: &str) -> ShopResult<Option<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE slug = $1 AND deleted_at IS NULL",
      PRODUCT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Product>(&sql).bind(slug).fetch_optional(&self.pool).await?)
  }

  async fn list_products(&self, filter: &ProductFilter, page: PageRequest) -> ShopResult<Page<Product>> {
    let pattern = filter
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(like_pattern);
    let condition = "deleted_at IS NULL AND is_active \
      AND ($1::uuid IS NULL OR category_id = $1) \
      AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)";

    let count_sql = format!("SELECT COUNT(*) FROM products WHERE {}", condition);
    let total: i64 = sqlx::query_scalar(&count_sql)
      .bind(filter.category_id)
      .bind(&pattern)
      .fetch_one(&self.pool)
      .await?;

    let sql = format!(
      "SELECT {} FROM products WHERE {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
      PRODUCT_COLUMNS, condition
    );
    let items = sqlx::query_as::<_, Product>(&sql)
      .bind(filter.category_id)
      .bind(&pattern)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn update_product(&self, product: &Product) -> ShopResult<()> {
    let result = sqlx::query(
      "UPDATE products SET title = $2, slug = $3, description = $4, category_id = $5, product_type = $6, \
       price_cents = $7, discount_price_cents = $8, preview_images = $9, demo_url = $10, file_url = $11, \
       tech_stack = $12, features = $13, requirements = $14, is_active = $15, updated_at = $16 \
       WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(product.id)
    .bind(&product.title)
    .bind(&product.slug)
    .bind(&product.description)
    .bind(product.category_id)
    .bind(product.product_type)
    .bind(product.price_cents)
    .bind(product.discount_price_cents)
    .bind(&product.preview_images)
    .bind(&product.demo_url)
    .bind(&product.file_url)
    .bind(&product.tech_stack)
    .bind(&product.features)
    .bind(&product.requirements)
    .bind(product.is_active)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    ensure_affected(result.rows_affected(), "product")
  }

  async fn soft_delete_product(&self, id: Uuid) -> ShopResult<()> {
    let result = sqlx::query("UPDATE products SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(id)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "product")
  }

  async fn increment_product_views(&self, id: Uuid) -> ShopResult<()> {
    sqlx::query("UPDATE products SET views_count = views_count + 1 WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn increment_product_downloads(&self, id: Uuid) -> ShopResult<()> {
    sqlx::query("UPDATE products SET downloads_count = downloads_count + 1 WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn set_product_rating(&self, id: Uuid, rating_average: f64) -> ShopResult<()> {
    sqlx::query("UPDATE products SET rating_average = $2 WHERE id = $1")
      .bind(id)
      .bind(rating_average)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn all_products(&self) -> ShopResult<Vec<Product>> {
    let sql = format!("SELECT {} FROM products WHERE deleted_at IS NULL", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> ShopResult<CartItem> {
    let sql = format!(
      "INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, now(), now()) \
       ON CONFLICT (user_id, product_id) \
       DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = now() \
       RETURNING {}",
      CART_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, CartItem>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn find_cart_item(&self, id: Uuid) -> ShopResult<Option<CartItem>> {
    let sql = format!("SELECT {} FROM cart_items WHERE id = $1", CART_COLUMNS);
    Ok(sqlx::query_as::<_, CartItem>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn list_cart(&self, user_id: Uuid) -> ShopResult<Vec<CartItem>> {
    let sql = format!(
      "SELECT {} FROM cart_items WHERE user_id = $1 ORDER BY created_at DESC",
      CART_COLUMNS
    );
    Ok(sqlx::query_as::<_, CartItem>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn update_cart_quantity(&self, id: Uuid, quantity: i32) -> ShopResult<()> {
    let result = sqlx::query("UPDATE cart_items SET quantity = $2, updated_at = now() WHERE id = $1")
      .bind(id)
      .bind(quantity)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "cart item")
  }

  async fn remove_cart_item(&self, id: Uuid) -> ShopResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn clear_cart(&self, user_id: Uuid) -> ShopResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl WishlistStore for PgStore {
  async fn insert_wishlist_item(&self, item: &WishlistItem) -> ShopResult<()> {
    sqlx::query("INSERT INTO wishlist_items (id, user_id, product_id, created_at) VALUES ($1, $2, $3, $4)")
      .bind(item.id)
      .bind(item.user_id)
      .bind(item.product_id)
      .bind(item.created_at)
      .execute(&self.pool)
      .await
      .map_err(|e| match ShopError::from(e) {
        ShopError::Conflict(_) => ShopError::conflict("product already in wishlist"),
        other => other,
      })?;
    Ok(())
  }

  async fn find_wishlist_item(&self, id: Uuid) -> ShopResult<Option<WishlistItem>> {
    let sql = format!("SELECT {} FROM wishlist_items WHERE id = $1", WISHLIST_COLUMNS);
    Ok(sqlx::query_as::<_, WishlistItem>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_wishlist_entry(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<WishlistItem>> {
    let sql = format!(
      "SELECT {} FROM wishlist_items WHERE user_id = $1 AND product_id = $2",
      WISHLIST_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, WishlistItem>(&sql)
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn list_wishlist(&self, user_id: Uuid) -> ShopResult<Vec<WishlistItem>> {
    let sql = format!(
      "SELECT {} FROM wishlist_items WHERE user_id = $1 ORDER BY created_at DESC",
      WISHLIST_COLUMNS
    );
    Ok(sqlx::query_as::<_, WishlistItem>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn remove_wishlist_item(&self, id: Uuid) -> ShopResult<()> {
    sqlx::query("DELETE FROM wishlist_items WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn clear_wishlist(&self, user_id: Uuid) -> ShopResult<()> {
    sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn create_order(&self, order: &Order, transaction: &Transaction) -> ShopResult<()> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "INSERT INTO orders (id, order_number, user_id, product_id, order_type, status, payment_status, quantity, \
       total_amount_cents, discount_amount_cents, final_amount_cents, payment_method, notes, version, created_at, \
       updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.user_id)
    .bind(order.product_id)
    .bind(order.order_type)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.quantity)
    .bind(order.total_amount_cents)
    .bind(order.discount_amount_cents)
    .bind(order.final_amount_cents)
    .bind(&order.payment_method)
    .bind(&order.notes)
    .bind(order.version)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
      "INSERT INTO transactions (id, order_id, user_id, transaction_number, amount_cents, payment_method, \
       payment_gateway, payment_gateway_ref, status, paid_at, metadata, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(transaction.id)
    .bind(transaction.order_id)
    .bind(transaction.user_id)
    .bind(&transaction.transaction_number)
    .bind(transaction.amount_cents)
    .bind(&transaction.payment_method)
    .bind(&transaction.payment_gateway)
    .bind(&transaction.payment_gateway_ref)
    .bind(transaction.status)
    .bind(transaction.paid_at)
    .bind(&transaction.metadata)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    debug!(order_id = %order.id, "Order and transaction committed.");
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> ShopResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1 AND deleted_at IS NULL", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE order_number = $1 AND deleted_at IS NULL",
      ORDER_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn find_transaction_for_order(&self, order_id: Uuid) -> ShopResult<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE order_id = $1", TRANSACTION_COLUMNS);
    Ok(
      sqlx::query_as::<_, Transaction>(&sql)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn save_transition(
    &self,
    order: &Order,
    transaction: &Transaction,
    expected_version: i32,
  ) -> ShopResult<Order> {
    let mut tx = self.pool.begin().await?;

    let sql = format!(
      "UPDATE orders SET status = $3, payment_status = $4, notes = $5, updated_at = $6, version = version + 1 \
       WHERE id = $1 AND version = $2 AND deleted_at IS NULL RETURNING {}",
      ORDER_COLUMNS
    );
    let saved = sqlx::query_as::<_, Order>(&sql)
      .bind(order.id)
      .bind(expected_version)
      .bind(order.status)
      .bind(order.payment_status)
      .bind(&order.notes)
      .bind(order.updated_at)
      .fetch_optional(&mut *tx)
      .await?;

    let Some(saved) = saved else {
      tx.rollback().await?;
      warn!(order_id = %order.id, expected_version, "Order version check failed.");
      return Err(ShopError::conflict("order was modified concurrently"));
    };

    let result = sqlx::query(
      "UPDATE transactions SET status = $2, paid_at = $3, metadata = $4, payment_gateway_ref = $5, updated_at = $6 \
       WHERE order_id = $1",
    )
    .bind(order.id)
    .bind(transaction.status)
    .bind(transaction.paid_at)
    .bind(&transaction.metadata)
    .bind(&transaction.payment_gateway_ref)
    .bind(transaction.updated_at)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
      tx.rollback().await?;
      return Err(ShopError::not_found("transaction not found"));
    }

    tx.commit().await?;
    Ok(saved)
  }

  async fn list_user_orders(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Order>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND deleted_at IS NULL")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      ORDER_COLUMNS
    );
    let items = sqlx::query_as::<_, Order>(&sql)
      .bind(user_id)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn list_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> ShopResult<Page<Order>> {
    let condition = "deleted_at IS NULL AND ($1::order_status_enum IS NULL OR status = $1)";
    let count_sql = format!("SELECT COUNT(*) FROM orders WHERE {}", condition);
    let total: i64 = sqlx::query_scalar(&count_sql)
      .bind(status)
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM orders WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      ORDER_COLUMNS, condition
    );
    let items = sqlx::query_as::<_, Order>(&sql)
      .bind(status)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn all_orders(&self) -> ShopResult<Vec<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE deleted_at IS NULL", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).fetch_all(&self.pool).await?)
  }

  async fn find_paid_order(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 AND product_id = $2 AND payment_status = 'paid' \
       AND deleted_at IS NULL ORDER BY created_at DESC LIMIT 1",
      ORDER_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn list_transactions(
    &self,
    page: PageRequest,
    status: Option<TransactionStatus>,
  ) -> ShopResult<Page<Transaction>> {
    let condition = "($1::transaction_status_enum IS NULL OR status = $1)";
    let count_sql = format!("SELECT COUNT(*) FROM transactions WHERE {}", condition);
    let total: i64 = sqlx::query_scalar(&count_sql)
      .bind(status)
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM transactions WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      TRANSACTION_COLUMNS, condition
    );
    let items = sqlx::query_as::<_, Transaction>(&sql)
      .bind(status)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }
}

#[async_trait]
impl DownloadStore for PgStore {
  async fn insert_download(&self, download: &Download) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO downloads (id, user_id, product_id, order_id, download_token, expires_at, is_used, \
       downloaded_at, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(download.id)
    .bind(download.user_id)
    .bind(download.product_id)
    .bind(download.order_id)
    .bind(&download.download_token)
    .bind(download.expires_at)
    .bind(download.is_used)
    .bind(download.downloaded_at)
    .bind(download.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn list_user_downloads(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Download>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads WHERE user_id = $1")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM downloads WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      DOWNLOAD_COLUMNS
    );
    let items = sqlx::query_as::<_, Download>(&sql)
      .bind(user_id)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn download_history(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Vec<Download>> {
    let sql = format!(
      "SELECT {} FROM downloads WHERE user_id = $1 AND product_id = $2 ORDER BY created_at DESC",
      DOWNLOAD_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Download>(&sql)
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?,
    )
  }
}

#[async_trait]
impl ReviewStore for PgStore {
  async fn insert_review(&self, review: &Review) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO reviews (id, user_id, product_id, order_id, rating, comment, is_verified_purchase, created_at, \
       updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.product_id)
    .bind(review.order_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.is_verified_purchase)
    .bind(review.created_at)
    .bind(review.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_review(&self, id: Uuid) -> ShopResult<Option<Review>> {
    let sql = format!("SELECT {} FROM reviews WHERE id = $1 AND deleted_at IS NULL", REVIEW_COLUMNS);
    Ok(sqlx::query_as::<_, Review>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn update_review(&self, review: &Review) -> ShopResult<()> {
    let result = sqlx::query(
      "UPDATE reviews SET rating = $2, comment = $3, updated_at = $4 WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(review.id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.updated_at)
    .execute(&self.pool)
    .await?;
    ensure_affected(result.rows_affected(), "review")
  }

  async fn soft_delete_review(&self, id: Uuid) -> ShopResult<()> {
    let result = sqlx::query("UPDATE reviews SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(id)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "review")
  }

  async fn list_product_reviews(&self, product_id: Uuid, page: PageRequest) -> ShopResult<Page<Review>> {
    let total: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE product_id = $1 AND deleted_at IS NULL")
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
    let sql = format!(
      "SELECT {} FROM reviews WHERE product_id = $1 AND deleted_at IS NULL \
       ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      REVIEW_COLUMNS
    );
    let items = sqlx::query_as::<_, Review>(&sql)
      .bind(product_id)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn list_user_reviews(&self, user_id: Uuid) -> ShopResult<Vec<Review>> {
    let sql = format!(
      "SELECT {} FROM reviews WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
      REVIEW_COLUMNS
    );
    Ok(sqlx::query_as::<_, Review>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn average_rating(&self, product_id: Uuid) -> ShopResult<f64> {
    let avg: Option<f64> = sqlx::query_scalar(
      "SELECT AVG(rating)::double precision FROM reviews WHERE product_id = $1 AND deleted_at IS NULL",
    )
    .bind(product_id)
    .fetch_one(&self.pool)
    .await?;
    Ok(avg.unwrap_or(0.0))
  }
}

#[async_trait]
impl NotificationStore for PgStore {
  async fn insert_notification(&self, notification: &Notification) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO notifications (id, user_id, kind, title, message, action_url, is_read, read_at, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.action_url)
    .bind(notification.is_read)
    .bind(notification.read_at)
    .bind(notification.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_notification(&self, id: Uuid) -> ShopResult<Option<Notification>> {
    let sql = format!(
      "SELECT {} FROM notifications WHERE id = $1 AND deleted_at IS NULL",
      NOTIFICATION_COLUMNS
    );
    Ok(sqlx::query_as::<_, Notification>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn list_notifications(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Notification>> {
    let total: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND deleted_at IS NULL")
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
    let sql = format!(
      "SELECT {} FROM notifications WHERE user_id = $1 AND deleted_at IS NULL \
       ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      NOTIFICATION_COLUMNS
    );
    let items = sqlx::query_as::<_, Notification>(&sql)
      .bind(user_id)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }

  async fn list_unread(&self, user_id: Uuid) -> ShopResult<Vec<Notification>> {
    let sql = format!(
      "SELECT {} FROM notifications WHERE user_id = $1 AND NOT is_read AND deleted_at IS NULL \
       ORDER BY created_at DESC",
      NOTIFICATION_COLUMNS
    );
    Ok(sqlx::query_as::<_, Notification>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> ShopResult<()> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE, read_at = $2 WHERE id = $1")
      .bind(id)
      .bind(at)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "notification")
  }

  async fn mark_all_read(&self, user_id: Uuid, at: DateTime<Utc>) -> ShopResult<u64> {
    let result = sqlx::query(
      "UPDATE notifications SET is_read = TRUE, read_at = $2 \
       WHERE user_id = $1 AND NOT is_read AND deleted_at IS NULL",
    )
    .bind(user_id)
    .bind(at)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected())
  }

  async fn soft_delete_notification(&self, id: Uuid) -> ShopResult<()> {
    let result = sqlx::query("UPDATE notifications SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
      .bind(id)
      .execute(&self.pool)
      .await?;
    ensure_affected(result.rows_affected(), "notification")
  }
}

#[async_trait]
impl CustomOrderStore for PgStore {
  async fn insert_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO custom_orders (id, order_id, user_id, title, description, requirements, budget_min_cents, \
       budget_max_cents, deadline, status, admin_notes, quote_amount_cents, agreed_amount_cents, created_at, \
       updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(custom_order.id)
    .bind(custom_order.order_id)
    .bind(custom_order.user_id)
    .bind(&custom_order.title)
    .bind(&custom_order.description)
    .bind(&custom_order.requirements)
    .bind(custom_order.budget_min_cents)
    .bind(custom_order.budget_max_cents)
    .bind(custom_order.deadline)
    .bind(custom_order.status)
    .bind(&custom_order.admin_notes)
    .bind(custom_order.quote_amount_cents)
    .bind(custom_order.agreed_amount_cents)
    .bind(custom_order.created_at)
    .bind(custom_order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_custom_order(&self, id: Uuid) -> ShopResult<Option<CustomOrder>> {
    let sql = format!(
      "SELECT {} FROM custom_orders WHERE id = $1 AND deleted_at IS NULL",
      CUSTOM_ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, CustomOrder>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn update_custom_order(&self, custom_order: &CustomOrder) -> ShopResult<()> {
    let result = sqlx::query(
      "UPDATE custom_orders SET order_id = $2, title = $3, description = $4, requirements = $5, \
       budget_min_cents = $6, budget_max_cents = $7, deadline = $8, status = $9, admin_notes = $10, \
       quote_amount_cents = $11, agreed_amount_cents = $12, updated_at = $13 \
       WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(custom_order.id)
    .bind(custom_order.order_id)
    .bind(&custom_order.title)
    .bind(&custom_order.description)
    .bind(&custom_order.requirements)
    .bind(custom_order.budget_min_cents)
    .bind(custom_order.budget_max_cents)
    .bind(custom_order.deadline)
    .bind(custom_order.status)
    .bind(&custom_order.admin_notes)
    .bind(custom_order.quote_amount_cents)
    .bind(custom_order.agreed_amount_cents)
    .bind(custom_order.updated_at)
    .execute(&self.pool)
    .await?;
    ensure_affected(result.rows_affected(), "custom order")
  }

  async fn list_user_custom_orders(&self, user_id: Uuid) -> ShopResult<Vec<CustomOrder>> {
    let sql = format!(
      "SELECT {} FROM custom_orders WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
      CUSTOM_ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, CustomOrder>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn list_custom_orders(
    &self,
    page: PageRequest,
    status: Option<CustomOrderStatus>,
  ) -> ShopResult<Page<CustomOrder>> {
    let condition = "deleted_at IS NULL AND ($1::custom_order_status_enum IS NULL OR status = $1)";
    let count_sql = format!("SELECT COUNT(*) FROM custom_orders WHERE {}", condition);
    let total: i64 = sqlx::query_scalar(&count_sql)
      .bind(status)
      .fetch_one(&self.pool)
      .await?;
    let sql = format!(
      "SELECT {} FROM custom_orders WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
      CUSTOM_ORDER_COLUMNS, condition
    );
    let items = sqlx::query_as::<_, CustomOrder>(&sql)
      .bind(status)
      .bind(page.limit)
      .bind(page.offset())
      .fetch_all(&self.pool)
      .await?;
    Ok(Page::new(items, total, page))
  }
}

#[async_trait]
impl ApiLogStore for PgStore {
  async fn insert_api_log(&self, entry: &ApiLog) -> ShopResult<()> {
    sqlx::query(
      "INSERT INTO api_logs (id, user_id, method, endpoint, status_code, response_time_ms, ip_address, \
       user_agent, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(entry.id)
    .bind(entry.user_id)
    .bind(&entry.method)
    .bind(&entry.endpoint)
    .bind(entry.status_code)
    .bind(entry.response_time_ms)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(&entry.error_message)
    .bind(entry.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}
