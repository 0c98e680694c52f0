// core/src/models/transaction.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "transaction_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Success,
  Failed,
  Cancelled,
}

/// Audit trail stored in the transaction's JSON metadata column. Each
/// workflow step fills in its own fields and leaves the rest untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAudit {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub proof_image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verified_by: Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verified_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refunded_by: Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refunded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
  pub id: Uuid,
  pub order_id: Uuid,
  pub user_id: Uuid,
  pub transaction_number: String,
  pub amount_cents: i64,
  pub payment_method: String,
  pub payment_gateway: String,
  pub payment_gateway_ref: Option<String>,
  pub status: TransactionStatus,
  pub paid_at: Option<DateTime<Utc>>,
  pub metadata: Json<PaymentAudit>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Transaction {
  /// The pending payment record that accompanies a freshly created order.
  pub fn pending_for(
    order_id: Uuid,
    user_id: Uuid,
    transaction_number: String,
    amount_cents: i64,
    payment_method: &str,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      order_id,
      user_id,
      transaction_number,
      amount_cents,
      payment_method: payment_method.to_string(),
      payment_gateway: "manual".to_string(),
      payment_gateway_ref: None,
      status: TransactionStatus::Pending,
      paid_at: None,
      metadata: Json(PaymentAudit::default()),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn audit(&self) -> &PaymentAudit {
    &self.metadata.0
  }

  pub fn audit_mut(&mut self) -> &mut PaymentAudit {
    &mut self.metadata.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_audit_serializes_to_empty_object() {
    let json = serde_json::to_string(&PaymentAudit::default()).unwrap();
    assert_eq!(json, "{}");
  }

  #[test]
  fn audit_fields_accumulate() {
    let mut txn = Transaction::pending_for(Uuid::new_v4(), Uuid::new_v4(), "TRX-1".into(), 100, "manual_transfer");
    txn.audit_mut().proof_image = Some("payment_proofs/a.png".into());
    txn.audit_mut().reason = Some("blurry proof".into());
    let value = serde_json::to_value(txn.audit()).unwrap();
    assert_eq!(value["proof_image"], "payment_proofs/a.png");
    assert_eq!(value["reason"], "blurry proof");
    assert!(value.get("verified_by").is_none());
  }
}
