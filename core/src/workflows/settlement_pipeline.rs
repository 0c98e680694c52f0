// core/src/workflows/settlement_pipeline.rs

//! Admin decisions on a payment: approve, reject or refund.

use super::common_steps;
use super::contexts::{SettlementCtxData, SettlementDecision};
use crate::error::{ShopError, ShopResult};
use crate::models::{NewNotification, NotificationKind, Order, OrderStatus, PaymentStatus, TransactionStatus};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use chrono::Utc;
use tracing::{info, instrument};

pub fn build_settlement_pipeline() -> Result<Pipeline<SettlementCtxData, ShopError>, PipelineError> {
  let mut p = Pipeline::<SettlementCtxData, ShopError>::new(
    "settlement",
    &[
      ("check_decision", false),
      ("load_order", false),
      ("apply_decision", false),
      ("notify_buyer", true),
    ],
  );

  p.on("check_decision", check_decision)?
    .on("load_order", load_order)?
    .on("apply_decision", apply_decision)?
    .on("notify_buyer", notify_buyer)?;

  Ok(p)
}

#[instrument(name = "settlement::check_decision", skip_all)]
async fn check_decision(ctx: ContextData<SettlementCtxData>) -> ShopResult<PipelineControl> {
  let decision = ctx.with(|d| d.decision.clone());
  match decision {
    SettlementDecision::Approve => {}
    SettlementDecision::Reject { reason } | SettlementDecision::Refund { reason } => {
      if reason.trim().is_empty() {
        return Err(ShopError::validation("reason is required"));
      }
    }
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "settlement::load_order", skip_all)]
async fn load_order(ctx: ContextData<SettlementCtxData>) -> ShopResult<PipelineControl> {
  let (orders, order_id, decision) = ctx.with(|d| (d.deps.orders.clone(), d.order_id, d.decision.clone()));

  let (order, transaction) = common_steps::load_order_with_transaction(orders.as_ref(), order_id).await?;
  match decision {
    SettlementDecision::Approve | SettlementDecision::Reject { .. } if !order.is_awaiting_confirmation() => {
      return Err(ShopError::invalid_state("order is not waiting for confirmation"));
    }
    SettlementDecision::Refund { .. } if !order.can_refund() => {
      return Err(ShopError::invalid_state("order cannot be refunded"));
    }
    _ => {}
  }

  ctx.update(|d| {
    d.order = Some(order);
    d.transaction = Some(transaction);
  });
  Ok(PipelineControl::Continue)
}

#[instrument(name = "settlement::apply_decision", skip_all, fields(decision))]
async fn apply_decision(ctx: ContextData<SettlementCtxData>) -> ShopResult<PipelineControl> {
  let (orders, admin_id, decision, order, transaction) = {
    let guard = ctx.read();
    match (&guard.order, &guard.transaction) {
      (Some(order), Some(transaction)) => (
        guard.deps.orders.clone(),
        guard.admin_id,
        guard.decision.clone(),
        order.clone(),
        transaction.clone(),
      ),
      _ => return Err(ShopError::Internal("settlement context is incomplete".to_string())),
    }
  };
  tracing::Span::current().record("decision", decision.label());

  let now = Utc::now();
  let expected_version = order.version;
  let mut order = order;
  let mut transaction = transaction;

  match &decision {
    SettlementDecision::Approve => {
      order.set_state(OrderStatus::Completed, PaymentStatus::Paid);
      transaction.status = TransactionStatus::Success;
      transaction.paid_at = Some(now);
      let audit = transaction.audit_mut();
      audit.verified_by = Some(admin_id);
      audit.verified_at = Some(now);
    }
    SettlementDecision::Reject { reason } => {
      order.set_state(OrderStatus::Cancelled, PaymentStatus::Failed);
      transaction.status = TransactionStatus::Failed;
      let audit = transaction.audit_mut();
      audit.verified_by = Some(admin_id);
      audit.verified_at = Some(now);
      audit.reason = Some(reason.clone());
    }
    SettlementDecision::Refund { reason } => {
      order.set_state(OrderStatus::Refunded, PaymentStatus::Refunded);
      let audit = transaction.audit_mut();
      audit.refunded_by = Some(admin_id);
      audit.refunded_at = Some(now);
      audit.reason = Some(reason.clone());
    }
  }
  transaction.updated_at = now;

  let saved = common_steps::save_guarded(orders.as_ref(), &order, &transaction, expected_version).await?;
  info!(
    order_id = %saved.id,
    %admin_id,
    decision = decision.label(),
    "Settlement decision applied."
  );

  ctx.update(|d| {
    d.order = Some(saved);
    d.transaction = Some(transaction);
  });
  Ok(PipelineControl::Continue)
}

fn buyer_notification(order: &Order, decision: &SettlementDecision) -> NewNotification {
  let (title, message) = match decision {
    SettlementDecision::Approve => (
      "Payment approved",
      format!("Payment for order {} has been approved.", order.order_number),
    ),
    SettlementDecision::Reject { reason } => (
      "Payment rejected",
      format!("Payment for order {} was rejected: {}", order.order_number, reason),
    ),
    SettlementDecision::Refund { reason } => (
      "Order refunded",
      format!("Order {} has been refunded: {}", order.order_number, reason),
    ),
  };
  NewNotification::new(order.user_id, NotificationKind::Payment, title, message)
    .with_action_url(format!("/orders/{}", order.id))
}

#[instrument(name = "settlement::notify_buyer", skip_all)]
async fn notify_buyer(ctx: ContextData<SettlementCtxData>) -> ShopResult<PipelineControl> {
  let Some((notifications, notification)) = ctx.with(|d| {
    d.order
      .as_ref()
      .map(|order| (d.deps.notifications.clone(), buyer_notification(order, &d.decision)))
  }) else {
    return Ok(PipelineControl::Continue);
  };

  common_steps::notify(&notifications, notification).await?;
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::OrderAmounts;
  use uuid::Uuid;

  #[test]
  fn notifications_mention_the_order_number() {
    let amounts = OrderAmounts::new(100, 1, 0).unwrap();
    let order = Order::new_product_order("ORD-20240101-ABCDEF0123".into(), Uuid::new_v4(), Uuid::new_v4(), 1, amounts, None);

    let rejected = buyer_notification(&order, &SettlementDecision::Reject { reason: "blurry proof".into() });
    assert_eq!(rejected.kind, NotificationKind::Payment);
    assert!(rejected.message.contains("ORD-20240101-ABCDEF0123"));
    assert!(rejected.message.contains("blurry proof"));
    assert_eq!(rejected.action_url, Some(format!("/orders/{}", order.id)));
  }

  #[test]
  fn pipeline_lists_steps_in_order() {
    let p = build_settlement_pipeline().unwrap();
    assert_eq!(p.step_names(), vec!["check_decision", "load_order", "apply_decision", "notify_buyer"]);
  }
}
