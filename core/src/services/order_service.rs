// core/src/services/order_service.rs

//! Entry points for the order/payment workflow. Multi-step transitions run
//! through the pipelines in [`crate::workflows`]; cancellation and the read
//! side are plain store calls.

use crate::auth::Identity;
use crate::error::{ShopError, ShopResult};
use crate::files::UploadedFile;
use crate::models::{
  Order, OrderStatus, Page, PageRequest, PaymentStatus, Transaction, TransactionStatus, DEFAULT_PAGE_LIMIT,
};
use crate::pipeline::{ContextData, Pipeline, PipelineError, PipelineResult};
use crate::workflows::common_steps::{load_order_with_transaction, save_guarded};
use crate::workflows::{
  build_checkout_pipeline, build_payment_proof_pipeline, build_settlement_pipeline, CheckoutCtxData,
  PaymentProofCtxData, SettlementCtxData, SettlementDecision, WorkflowDeps,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderService {
  deps: WorkflowDeps,
  checkout: Arc<Pipeline<CheckoutCtxData, ShopError>>,
  payment_proof: Arc<Pipeline<PaymentProofCtxData, ShopError>>,
  settlement: Arc<Pipeline<SettlementCtxData, ShopError>>,
}

/// Runs a pipeline to completion. A handler asking to stop early is treated
/// as a failure, since every order pipeline must reach its last step.
async fn drive<T>(pipeline: &Pipeline<T, ShopError>, ctx: ContextData<T>) -> ShopResult<()>
where
  T: Send + Sync + 'static,
{
  match pipeline.run(ctx).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(
      PipelineError::Halted {
        pipeline: pipeline.name().to_string(),
      }
      .into(),
    ),
  }
}

fn finished_order(order: Option<Order>) -> ShopResult<Order> {
  order.ok_or_else(|| ShopError::Internal("workflow finished without an order".to_string()))
}

impl OrderService {
  pub fn new(deps: WorkflowDeps) -> ShopResult<Self> {
    Ok(Self {
      deps,
      checkout: Arc::new(build_checkout_pipeline()?),
      payment_proof: Arc::new(build_payment_proof_pipeline()?),
      settlement: Arc::new(build_settlement_pipeline()?),
    })
  }

  /// Creates a `(pending, pending)` order and its pending transaction.
  #[instrument(name = "orders::create", skip(self, notes))]
  pub async fn create_order(
    &self,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    notes: Option<String>,
  ) -> ShopResult<Order> {
    let ctx = ContextData::new(CheckoutCtxData::new(
      self.deps.clone(),
      user_id,
      product_id,
      quantity,
      notes,
    ));
    drive(&self.checkout, ctx.clone()).await?;
    let (order, buyer_notified) = ctx.with(|d| (d.order.clone(), d.buyer_notified));
    let order = finished_order(order)?;
    if !buyer_notified {
      warn!(order_id = %order.id, "Order created without a buyer notification.");
    }
    Ok(order)
  }

  #[instrument(name = "orders::upload_payment_proof", skip(self, file), fields(bytes = file.bytes.len()))]
  pub async fn upload_payment_proof(&self, user_id: Uuid, order_id: Uuid, file: UploadedFile) -> ShopResult<Order> {
    let ctx = ContextData::new(PaymentProofCtxData::new(self.deps.clone(), user_id, order_id, file));
    drive(&self.payment_proof, ctx.clone()).await?;
    finished_order(ctx.with(|d| d.order.clone()))
  }

  async fn settle(&self, admin: Identity, order_id: Uuid, decision: SettlementDecision) -> ShopResult<Order> {
    admin.require_admin()?;
    let ctx = ContextData::new(SettlementCtxData::new(
      self.deps.clone(),
      admin.user_id,
      order_id,
      decision,
    ));
    drive(&self.settlement, ctx.clone()).await?;
    finished_order(ctx.with(|d| d.order.clone()))
  }

  /// `(processing, pending)` to `(completed, paid)`.
  #[instrument(name = "orders::approve_payment", skip(self), fields(admin_id = %admin.user_id))]
  pub async fn approve_payment(&self, admin: Identity, order_id: Uuid) -> ShopResult<Order> {
    self.settle(admin, order_id, SettlementDecision::Approve).await
  }

  /// `(processing, pending)` to `(cancelled, failed)`.
  #[instrument(name = "orders::reject_payment", skip(self, reason), fields(admin_id = %admin.user_id))]
  pub async fn reject_payment(&self, admin: Identity, order_id: Uuid, reason: &str) -> ShopResult<Order> {
    let decision = SettlementDecision::Reject {
      reason: reason.trim().to_string(),
    };
    self.settle(admin, order_id, decision).await
  }

  /// `(completed, paid)` to `(refunded, refunded)`.
  #[instrument(name = "orders::refund", skip(self, reason), fields(admin_id = %admin.user_id))]
  pub async fn refund_order(&self, admin: Identity, order_id: Uuid, reason: &str) -> ShopResult<Order> {
    let decision = SettlementDecision::Refund {
      reason: reason.trim().to_string(),
    };
    self.settle(admin, order_id, decision).await
  }

  /// Cancels an unpaid order. Cancelling an order that is already cancelled
  /// succeeds and leaves it `(cancelled, cancelled)`.
  #[instrument(name = "orders::cancel", skip(self))]
  pub async fn cancel_order(&self, user_id: Uuid, order_id: Uuid) -> ShopResult<Order> {
    let (mut order, mut transaction) = load_order_with_transaction(self.deps.orders.as_ref(), order_id).await?;
    if !order.is_owned_by(user_id) {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    if !order.can_cancel() {
      return Err(ShopError::invalid_state("order cannot be cancelled"));
    }

    let expected_version = order.version;
    order.set_state(OrderStatus::Cancelled, PaymentStatus::Cancelled);
    if transaction.status == TransactionStatus::Pending {
      transaction.status = TransactionStatus::Cancelled;
      transaction.updated_at = Utc::now();
    }

    let saved = save_guarded(self.deps.orders.as_ref(), &order, &transaction, expected_version).await?;
    info!(order_id = %saved.id, "Order cancelled.");
    Ok(saved)
  }

  pub async fn get_order(&self, identity: Identity, order_id: Uuid) -> ShopResult<Order> {
    let order = self
      .deps
      .orders
      .find_order(order_id)
      .await?
      .ok_or_else(|| ShopError::not_found("order not found"))?;
    if !identity.can_access(order.user_id) {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    Ok(order)
  }

  pub async fn get_order_by_number(&self, identity: Identity, order_number: &str) -> ShopResult<Order> {
    let order = self
      .deps
      .orders
      .find_order_by_number(order_number)
      .await?
      .ok_or_else(|| ShopError::not_found("order not found"))?;
    if !identity.can_access(order.user_id) {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    Ok(order)
  }

  pub async fn list_user_orders(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Order>> {
    self
      .deps
      .orders
      .list_user_orders(user_id, page.normalized(DEFAULT_PAGE_LIMIT))
      .await
  }

  pub async fn list_all_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> ShopResult<Page<Order>> {
    self
      .deps
      .orders
      .list_orders(page.normalized(DEFAULT_PAGE_LIMIT), status)
      .await
  }

  pub async fn get_transaction(&self, identity: Identity, order_id: Uuid) -> ShopResult<Transaction> {
    let order = self.get_order(identity, order_id).await?;
    self
      .deps
      .orders
      .find_transaction_for_order(order.id)
      .await?
      .ok_or_else(|| ShopError::not_found("transaction not found"))
  }

  pub async fn list_pending_transactions(&self, page: PageRequest) -> ShopResult<Page<Transaction>> {
    self
      .deps
      .orders
      .list_transactions(page.normalized(DEFAULT_PAGE_LIMIT), Some(TransactionStatus::Pending))
      .await
  }
}
