// core/src/workflows/checkout_pipeline.rs

use super::common_steps;
use super::contexts::CheckoutCtxData;
use crate::error::{ShopError, ShopResult};
use crate::models::order::{generate_order_number, generate_transaction_number};
use crate::models::{NewNotification, NotificationKind, Order, OrderAmounts, Transaction};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use chrono::Utc;
use tracing::{info, instrument, warn};

/// Attempts at finding an unused order number before giving up.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

pub fn build_checkout_pipeline() -> Result<Pipeline<CheckoutCtxData, ShopError>, PipelineError> {
  let mut p = Pipeline::<CheckoutCtxData, ShopError>::new(
    "checkout",
    &[
      ("validate_request", false),
      ("load_product", false),
      ("price_order", false),
      ("persist_order", false),
      ("notify_buyer", true),
    ],
  );

  p.on("validate_request", validate_request)?
    .on("load_product", load_product)?
    .on("price_order", price_order)?
    .on("persist_order", persist_order)?
    .on("notify_buyer", notify_buyer)?;

  Ok(p)
}

#[instrument(name = "checkout::validate_request", skip_all)]
async fn validate_request(ctx: ContextData<CheckoutCtxData>) -> ShopResult<PipelineControl> {
  let quantity = ctx.read().quantity;
  if quantity <= 0 {
    return Err(ShopError::validation("quantity must be greater than 0"));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::load_product", skip_all)]
async fn load_product(ctx: ContextData<CheckoutCtxData>) -> ShopResult<PipelineControl> {
  let (products, product_id) = {
    let guard = ctx.read();
    (guard.deps.products.clone(), guard.product_id)
  };

  let product = products
    .find_product(product_id)
    .await?
    .ok_or_else(|| ShopError::not_found("product not found"))?;
  if !product.is_purchasable() {
    return Err(ShopError::invalid_state("product is not available"));
  }

  ctx.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::price_order", skip_all)]
async fn price_order(ctx: ContextData<CheckoutCtxData>) -> ShopResult<PipelineControl> {
  let mut guard = ctx.write();
  let unit_price = guard
    .product
    .as_ref()
    .map(|p| p.effective_price_cents())
    .ok_or_else(|| ShopError::Internal("product must be loaded before pricing".to_string()))?;
  let amounts = OrderAmounts::new(unit_price, guard.quantity, 0)?;
  guard.amounts = Some(amounts);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::persist_order", skip_all)]
async fn persist_order(ctx: ContextData<CheckoutCtxData>) -> ShopResult<PipelineControl> {
  let (orders, user_id, product_id, quantity, notes, amounts) = {
    let guard = ctx.read();
    let amounts = guard
      .amounts
      .ok_or_else(|| ShopError::Internal("order must be priced before it is persisted".to_string()))?;
    (
      guard.deps.orders.clone(),
      guard.user_id,
      guard.product_id,
      guard.quantity,
      guard.notes.clone(),
      amounts,
    )
  };

  for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
    let now = Utc::now();
    let order = Order::new_product_order(
      generate_order_number(now),
      user_id,
      product_id,
      quantity,
      amounts,
      notes.clone(),
    );
    let transaction = Transaction::pending_for(
      order.id,
      user_id,
      generate_transaction_number(now),
      order.final_amount_cents,
      &order.payment_method,
    );

    match orders.create_order(&order, &transaction).await {
      Ok(()) => {
        info!(
          order_id = %order.id,
          order_number = %order.order_number,
          final_amount_cents = order.final_amount_cents,
          "Order created."
        );
        let mut guard = ctx.write();
        guard.order = Some(order);
        guard.transaction = Some(transaction);
        return Ok(PipelineControl::Continue);
      }
      Err(ShopError::Conflict(reason)) => {
        warn!(attempt, %reason, "Order number collision, regenerating.");
      }
      Err(e) => return Err(e),
    }
  }

  Err(ShopError::conflict("could not allocate a unique order number"))
}

#[instrument(name = "checkout::notify_buyer", skip_all)]
async fn notify_buyer(ctx: ContextData<CheckoutCtxData>) -> ShopResult<PipelineControl> {
  let (notifications, notification) = {
    let guard = ctx.read();
    let Some(order) = guard.order.as_ref() else {
      return Ok(PipelineControl::Continue);
    };
    let notification = NewNotification::new(
      order.user_id,
      NotificationKind::Order,
      "Order created",
      format!(
        "Order {} has been created. Upload your payment proof to continue.",
        order.order_number
      ),
    )
    .with_action_url(format!("/orders/{}", order.id));
    (guard.deps.notifications.clone(), notification)
  };

  common_steps::notify(&notifications, notification).await?;
  ctx.write().buyer_notified = true;
  Ok(PipelineControl::Continue)
}
