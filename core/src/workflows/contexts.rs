// core/src/workflows/contexts.rs

//! Context data threaded through the order pipelines. Handlers receive these
//! wrapped in [`crate::pipeline::ContextData`].

use crate::files::{FileStore, UploadedFile};
use crate::models::{Order, OrderAmounts, Product, Transaction};
use crate::services::NotificationService;
use crate::store::{OrderStore, ProductStore};
use std::sync::Arc;
use uuid::Uuid;

/// Collaborators every order pipeline needs.
#[derive(Clone)]
pub struct WorkflowDeps {
  pub orders: Arc<dyn OrderStore>,
  pub products: Arc<dyn ProductStore>,
  pub files: Arc<dyn FileStore>,
  pub notifications: NotificationService,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub deps: WorkflowDeps,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub notes: Option<String>,
  pub product: Option<Product>,
  pub amounts: Option<OrderAmounts>,
  pub order: Option<Order>,
  pub transaction: Option<Transaction>,
  pub buyer_notified: bool,
}

impl CheckoutCtxData {
  pub fn new(deps: WorkflowDeps, user_id: Uuid, product_id: Uuid, quantity: i32, notes: Option<String>) -> Self {
    Self {
      deps,
      user_id,
      product_id,
      quantity,
      notes,
      product: None,
      amounts: None,
      order: None,
      transaction: None,
      buyer_notified: false,
    }
  }
}

#[derive(Clone)]
pub struct PaymentProofCtxData {
  pub deps: WorkflowDeps,
  pub user_id: Uuid,
  pub order_id: Uuid,
  pub file: UploadedFile,
  pub order: Option<Order>,
  pub transaction: Option<Transaction>,
  pub stored_path: Option<String>,
  /// Proof replaced by this upload, removed once the new one is recorded.
  pub previous_proof: Option<String>,
}

impl PaymentProofCtxData {
  pub fn new(deps: WorkflowDeps, user_id: Uuid, order_id: Uuid, file: UploadedFile) -> Self {
    Self {
      deps,
      user_id,
      order_id,
      file,
      order: None,
      transaction: None,
      stored_path: None,
      previous_proof: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementDecision {
  Approve,
  Reject { reason: String },
  Refund { reason: String },
}

impl SettlementDecision {
  pub fn label(&self) -> &'static str {
    match self {
      SettlementDecision::Approve => "approve",
      SettlementDecision::Reject { .. } => "reject",
      SettlementDecision::Refund { .. } => "refund",
    }
  }
}

#[derive(Clone)]
pub struct SettlementCtxData {
  pub deps: WorkflowDeps,
  pub admin_id: Uuid,
  pub order_id: Uuid,
  pub decision: SettlementDecision,
  pub order: Option<Order>,
  pub transaction: Option<Transaction>,
}

impl SettlementCtxData {
  pub fn new(deps: WorkflowDeps, admin_id: Uuid, order_id: Uuid, decision: SettlementDecision) -> Self {
    Self {
      deps,
      admin_id,
      order_id,
      decision,
      order: None,
      transaction: None,
    }
  }
}
