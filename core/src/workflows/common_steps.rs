// core/src/workflows/common_steps.rs

//! Helpers shared by the order pipelines.

use crate::error::{ShopError, ShopResult};
use crate::models::{NewNotification, Order, Transaction};
use crate::services::NotificationService;
use crate::store::OrderStore;
use tracing::{info, warn};
use uuid::Uuid;

/// Loads an order and its transaction, failing with `NotFound` for either.
pub async fn load_order_with_transaction(orders: &dyn OrderStore, order_id: Uuid) -> ShopResult<(Order, Transaction)> {
  let order = orders
    .find_order(order_id)
    .await?
    .ok_or_else(|| ShopError::not_found("order not found"))?;
  let transaction = orders
    .find_transaction_for_order(order.id)
    .await?
    .ok_or_else(|| ShopError::not_found("transaction not found"))?;
  Ok((order, transaction))
}

/// Writes a transition with a version check. Losing the race surfaces as
/// `InvalidState`; the stored order is left as the winner wrote it.
pub async fn save_guarded(
  orders: &dyn OrderStore,
  order: &Order,
  transaction: &Transaction,
  expected_version: i32,
) -> ShopResult<Order> {
  match orders.save_transition(order, transaction, expected_version).await {
    Ok(saved) => {
      info!(
        order_id = %saved.id,
        status = %saved.status,
        payment_status = %saved.payment_status,
        version = saved.version,
        "Order transition saved."
      );
      Ok(saved)
    }
    Err(ShopError::Conflict(_)) => {
      warn!(order_id = %order.id, expected_version, "Order changed while the transition was in flight.");
      Err(ShopError::invalid_state("order was updated by another request, please retry"))
    }
    Err(e) => Err(e),
  }
}

/// Sends a user notification. Callers run this from optional steps, so a
/// failure is reported to the runner but never aborts the workflow.
pub async fn notify(notifications: &NotificationService, notification: NewNotification) -> ShopResult<()> {
  let user_id = notification.user_id;
  notifications.notify(notification).await.map(|_| ()).map_err(|e| {
    warn!(%user_id, error = %e, "Failed to deliver notification.");
    e
  })
}
