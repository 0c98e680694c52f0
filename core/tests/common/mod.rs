// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use storefront::auth::{Identity, TokenIssuer};
use storefront::error::{ShopError, ShopResult};
use storefront::files::{MemoryFileStore, UploadedFile};
use storefront::models::{
  CategoryRequest, NewProduct, Order, OrderStatus, Page, PageRequest, Product, ProductType, Transaction,
  TransactionStatus,
};
use storefront::services::{NotificationService, OrderService, RegisterRequest, Services};
use storefront::store::{MemoryStore, OrderStore};
use storefront::workflows::WorkflowDeps;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A fully wired shop over the in-memory store.
pub struct TestShop {
  pub store: Arc<MemoryStore>,
  pub files: Arc<MemoryFileStore>,
  pub services: Services,
}

impl TestShop {
  pub fn new() -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let files = Arc::new(MemoryFileStore::default());
    let tokens = TokenIssuer::new("test-secret", Duration::hours(1));
    let services = Services::new(store.clone(), files.clone(), tokens, Duration::hours(24)).unwrap();
    Self { store, files, services }
  }

  pub async fn user(&self, email: &str) -> Identity {
    let auth = self
      .services
      .users
      .register(RegisterRequest {
        name: "Buyer".into(),
        email: email.into(),
        password: "hunter22".into(),
      })
      .await
      .unwrap();
    Identity::user(auth.user.id)
  }

  pub fn admin(&self) -> Identity {
    Identity::admin(Uuid::new_v4())
  }

  pub async fn category(&self, name: &str) -> Uuid {
    self
      .services
      .catalog
      .create_category(CategoryRequest {
        name: name.into(),
        ..Default::default()
      })
      .await
      .unwrap()
      .id
  }

  pub async fn product(&self, title: &str, price_cents: i64, discount_price_cents: Option<i64>) -> Product {
    let category_id = self.category(&format!("{} category", title)).await;
    self
      .services
      .catalog
      .create_product(Uuid::new_v4(), new_product(title, category_id, price_cents, discount_price_cents), None)
      .await
      .unwrap()
  }

  pub async fn order_status(&self, order_id: Uuid) -> (Order, Transaction) {
    let order = self.store.find_order(order_id).await.unwrap().unwrap();
    let txn = self.store.find_transaction_for_order(order_id).await.unwrap().unwrap();
    (order, txn)
  }

  pub async fn order_count(&self) -> usize {
    self.store.all_orders().await.unwrap().len()
  }

  /// Creates an order and uploads a proof, leaving it `(processing, pending)`.
  pub async fn awaiting_confirmation(&self, buyer: Identity, product: &Product) -> Order {
    let order = self
      .services
      .orders
      .create_order(buyer.user_id, product.id, 1, None)
      .await
      .unwrap();
    self
      .services
      .orders
      .upload_payment_proof(buyer.user_id, order.id, png())
      .await
      .unwrap()
  }

  /// Pipeline collaborators backed by this shop's stores.
  pub fn workflow_deps(&self) -> WorkflowDeps {
    WorkflowDeps {
      orders: self.store.clone(),
      products: self.store.clone(),
      files: self.files.clone(),
      notifications: NotificationService::new(self.store.clone()),
    }
  }

  /// An order service whose order store is wrapped by `faulty`.
  pub fn order_service_with(&self, faulty: Arc<FaultyOrderStore>) -> OrderService {
    let deps = WorkflowDeps {
      orders: faulty,
      ..self.workflow_deps()
    };
    OrderService::new(deps).unwrap()
  }
}

pub fn new_product(title: &str, category_id: Uuid, price_cents: i64, discount_price_cents: Option<i64>) -> NewProduct {
  NewProduct {
    title: title.into(),
    description: format!("{} description", title),
    category_id,
    product_type: ProductType::SourceCode,
    price_cents,
    discount_price_cents,
    demo_url: None,
    file_url: None,
    tech_stack: vec!["rust".into()],
    features: vec![],
    requirements: vec![],
    is_active: true,
  }
}

pub fn png() -> UploadedFile {
  UploadedFile::new("proof.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  /// `save_transition` fails with a storage error.
  StorageDown,
  /// Another writer commits between the read and the guarded write.
  LostRace,
}

/// Delegates to a [`MemoryStore`] and injects one fault into the next
/// `save_transition` call.
pub struct FaultyOrderStore {
  pub inner: Arc<MemoryStore>,
  fault: Mutex<Option<Fault>>,
}

impl FaultyOrderStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      fault: Mutex::new(None),
    }
  }

  pub fn arm(&self, fault: Fault) {
    *self.fault.lock() = Some(fault);
  }
}

#[async_trait]
impl OrderStore for FaultyOrderStore {
  async fn create_order(&self, order: &Order, transaction: &Transaction) -> ShopResult<()> {
    self.inner.create_order(order, transaction).await
  }

  async fn find_order(&self, id: Uuid) -> ShopResult<Option<Order>> {
    self.inner.find_order(id).await
  }

  async fn find_order_by_number(&self, order_number: &str) -> ShopResult<Option<Order>> {
    self.inner.find_order_by_number(order_number).await
  }

  async fn find_transaction_for_order(&self, order_id: Uuid) -> ShopResult<Option<Transaction>> {
    self.inner.find_transaction_for_order(order_id).await
  }

  async fn save_transition(&self, order: &Order, transaction: &Transaction, expected_version: i32) -> ShopResult<Order> {
    let fault = self.fault.lock().take();
    match fault {
      Some(Fault::StorageDown) => Err(ShopError::Storage(anyhow::anyhow!("connection reset"))),
      Some(Fault::LostRace) => {
        let current = self.inner.find_order(order.id).await?.ok_or_else(|| ShopError::not_found("order not found"))?;
        let current_txn = self
          .inner
          .find_transaction_for_order(order.id)
          .await?
          .ok_or_else(|| ShopError::not_found("transaction not found"))?;
        self.inner.save_transition(&current, &current_txn, current.version).await?;
        self.inner.save_transition(order, transaction, expected_version).await
      }
      None => self.inner.save_transition(order, transaction, expected_version).await,
    }
  }

  async fn list_user_orders(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Order>> {
    self.inner.list_user_orders(user_id, page).await
  }

  async fn list_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> ShopResult<Page<Order>> {
    self.inner.list_orders(page, status).await
  }

  async fn all_orders(&self) -> ShopResult<Vec<Order>> {
    self.inner.all_orders().await
  }

  async fn find_paid_order(&self, user_id: Uuid, product_id: Uuid) -> ShopResult<Option<Order>> {
    self.inner.find_paid_order(user_id, product_id).await
  }

  async fn list_transactions(&self, page: PageRequest, status: Option<TransactionStatus>) -> ShopResult<Page<Transaction>> {
    self.inner.list_transactions(page, status).await
  }
}
