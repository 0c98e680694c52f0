// core/src/models/analytics.rs

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
  pub total_users: i64,
  pub total_products: i64,
  pub total_orders: i64,
  pub total_revenue_cents: i64,
  pub orders_by_status: BTreeMap<String, i64>,
  pub orders_last_7_days: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RevenueStats {
  pub total_revenue_cents: i64,
  pub completed_orders: i64,
  pub revenue_by_date: BTreeMap<NaiveDate, i64>,
  pub average_order_value_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
  pub product_id: Uuid,
  pub title: String,
  pub completed_orders: i64,
  pub revenue_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserStats {
  pub total_users: i64,
  pub users_by_role: BTreeMap<String, i64>,
  pub new_users_last_30_days: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderStats {
  pub total_orders: i64,
  pub orders_by_status: BTreeMap<String, i64>,
  pub orders_by_payment_status: BTreeMap<String, i64>,
  /// Share of orders that reached `completed`, in percent.
  pub conversion_rate: f64,
}
