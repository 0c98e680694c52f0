// core/src/models/order.rs

use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MANUAL_TRANSFER: &str = "manual_transfer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_type_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
  Product,
  Custom,
}

/// Fulfilment side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Cancelled,
  Refunded,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
      OrderStatus::Refunded => "refunded",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = ShopError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "processing" => Ok(OrderStatus::Processing),
      "completed" => Ok(OrderStatus::Completed),
      "cancelled" => Ok(OrderStatus::Cancelled),
      "refunded" => Ok(OrderStatus::Refunded),
      other => Err(ShopError::validation(format!("unknown order status '{}'", other))),
    }
  }
}

/// Payment side of an order, tracked independently of [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
  Cancelled,
  Refunded,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Failed => "failed",
      PaymentStatus::Cancelled => "cancelled",
      PaymentStatus::Refunded => "refunded",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Amounts in minor units. `final_cents` is always `total_cents -
/// discount_cents` and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAmounts {
  pub total_cents: i64,
  pub discount_cents: i64,
  pub final_cents: i64,
}

impl OrderAmounts {
  pub fn new(unit_price_cents: i64, quantity: i32, discount_cents: i64) -> ShopResult<Self> {
    if quantity <= 0 {
      return Err(ShopError::validation("quantity must be greater than 0"));
    }
    if unit_price_cents < 0 || discount_cents < 0 {
      return Err(ShopError::validation("amounts must not be negative"));
    }
    let total_cents = unit_price_cents
      .checked_mul(i64::from(quantity))
      .ok_or_else(|| ShopError::validation("order total is too large"))?;
    let discount_cents = discount_cents.min(total_cents);
    Ok(Self {
      total_cents,
      discount_cents,
      final_cents: total_cents - discount_cents,
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub user_id: Uuid,
  pub product_id: Option<Uuid>,
  pub order_type: OrderType,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub quantity: i32,
  pub total_amount_cents: i64,
  pub discount_amount_cents: i64,
  pub final_amount_cents: i64,
  pub payment_method: String,
  pub notes: Option<String>,
  /// Bumped by the store on every state transition; used for
  /// compare-and-swap writes.
  pub version: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
  pub fn new_product_order(
    order_number: String,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    amounts: OrderAmounts,
    notes: Option<String>,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      order_number,
      user_id,
      product_id: Some(product_id),
      order_type: OrderType::Product,
      status: OrderStatus::Pending,
      payment_status: PaymentStatus::Pending,
      quantity,
      total_amount_cents: amounts.total_cents,
      discount_amount_cents: amounts.discount_cents,
      final_amount_cents: amounts.final_cents,
      payment_method: MANUAL_TRANSFER.to_string(),
      notes,
      version: 0,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    }
  }

  pub fn state(&self) -> (OrderStatus, PaymentStatus) {
    (self.status, self.payment_status)
  }

  pub fn is_owned_by(&self, user_id: Uuid) -> bool {
    self.user_id == user_id
  }

  pub fn can_upload_proof(&self) -> bool {
    self.payment_status == PaymentStatus::Pending
  }

  /// Proof uploaded, admin decision outstanding.
  pub fn is_awaiting_confirmation(&self) -> bool {
    self.state() == (OrderStatus::Processing, PaymentStatus::Pending)
  }

  /// Anything not yet paid may be cancelled, including orders that are
  /// already cancelled. Refunded orders are closed.
  pub fn can_cancel(&self) -> bool {
    self.payment_status != PaymentStatus::Paid
      && self.status != OrderStatus::Completed
      && self.status != OrderStatus::Refunded
  }

  pub fn can_refund(&self) -> bool {
    self.state() == (OrderStatus::Completed, PaymentStatus::Paid)
  }

  pub fn grants_access_to(&self, product_id: Uuid) -> bool {
    self.product_id == Some(product_id) && self.payment_status == PaymentStatus::Paid
  }

  pub(crate) fn set_state(&mut self, status: OrderStatus, payment_status: PaymentStatus) {
    self.status = status;
    self.payment_status = payment_status;
    self.updated_at = Utc::now();
  }
}

/// `ORD-YYYYMMDD-XXXXXXXXXX`, ten uppercase hex characters from a random UUID.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
  format!("ORD-{}-{}", now.format("%Y%m%d"), random_suffix())
}

pub fn generate_transaction_number(now: DateTime<Utc>) -> String {
  format!("TRX-{}-{}", now.format("%Y%m%d"), random_suffix())
}

fn random_suffix() -> String {
  let hex = Uuid::new_v4().simple().to_string();
  hex[..10].to_uppercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn order_in(status: OrderStatus, payment_status: PaymentStatus) -> Order {
    let amounts = OrderAmounts::new(100, 1, 0).unwrap();
    let mut order = Order::new_product_order("ORD-T".into(), Uuid::new_v4(), Uuid::new_v4(), 1, amounts, None);
    order.status = status;
    order.payment_status = payment_status;
    order
  }

  #[test]
  fn amounts_multiply_and_clamp() {
    let amounts = OrderAmounts::new(10_000, 2, 0).unwrap();
    assert_eq!(amounts.total_cents, 20_000);
    assert_eq!(amounts.final_cents, 20_000);

    let clamped = OrderAmounts::new(500, 1, 900).unwrap();
    assert_eq!(clamped.discount_cents, 500);
    assert_eq!(clamped.final_cents, 0);
  }

  #[test]
  fn amounts_reject_bad_quantity() {
    assert!(matches!(OrderAmounts::new(100, 0, 0), Err(ShopError::Validation(_))));
    assert!(matches!(OrderAmounts::new(100, -4, 0), Err(ShopError::Validation(_))));
    assert!(matches!(OrderAmounts::new(i64::MAX, 2, 0), Err(ShopError::Validation(_))));
  }

  #[test]
  fn order_number_shape() {
    let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    let number = generate_order_number(now);
    assert!(number.starts_with("ORD-20240309-"));
    let suffix = &number["ORD-20240309-".len()..];
    assert_eq!(suffix.len(), 10);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    assert_ne!(number, generate_order_number(now));
    assert!(generate_transaction_number(now).starts_with("TRX-20240309-"));
  }

  #[test]
  fn guards_follow_the_state_table() {
    use OrderStatus as S;
    use PaymentStatus as P;

    assert!(order_in(S::Pending, P::Pending).can_upload_proof());
    assert!(order_in(S::Processing, P::Pending).can_upload_proof());
    assert!(!order_in(S::Cancelled, P::Failed).can_upload_proof());

    assert!(order_in(S::Processing, P::Pending).is_awaiting_confirmation());
    assert!(!order_in(S::Pending, P::Pending).is_awaiting_confirmation());
    assert!(!order_in(S::Completed, P::Paid).is_awaiting_confirmation());

    assert!(order_in(S::Pending, P::Pending).can_cancel());
    assert!(order_in(S::Cancelled, P::Failed).can_cancel());
    assert!(!order_in(S::Completed, P::Paid).can_cancel());
    assert!(!order_in(S::Processing, P::Paid).can_cancel());
    assert!(!order_in(S::Refunded, P::Refunded).can_cancel());

    assert!(order_in(S::Completed, P::Paid).can_refund());
    assert!(!order_in(S::Processing, P::Pending).can_refund());
  }

  #[test]
  fn parses_status_filter() {
    assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
    assert!("shipped".parse::<OrderStatus>().is_err());
  }
}
