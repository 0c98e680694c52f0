// core/src/services/analytics_service.rs

//! Read-only admin statistics, computed over full snapshots of the stores.

use crate::error::{ShopError, ShopResult};
use crate::models::{
  DashboardStats, Order, OrderStats, OrderStatus, RevenueStats, TopProduct, UserStats, DEFAULT_PAGE_LIMIT,
  MAX_PAGE_LIMIT,
};
use crate::store::{OrderStore, ProductStore, UserStore};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct AnalyticsService {
  users: Arc<dyn UserStore>,
  products: Arc<dyn ProductStore>,
  orders: Arc<dyn OrderStore>,
}

fn is_completed(order: &Order) -> bool {
  order.status == OrderStatus::Completed
}

fn revenue_of<'a>(orders: impl IntoIterator<Item = &'a Order>) -> i64 {
  orders
    .into_iter()
    .filter(|o| is_completed(o))
    .map(|o| o.final_amount_cents)
    .sum()
}

fn count_since(orders: &[Order], since: DateTime<Utc>) -> i64 {
  orders.iter().filter(|o| o.created_at >= since).count() as i64
}

fn revenue_between(orders: &[Order], start: NaiveDate, end: NaiveDate) -> ShopResult<RevenueStats> {
  if start > end {
    return Err(ShopError::validation("start date must not be after end date"));
  }
  let mut stats = RevenueStats::default();
  for order in orders.iter().filter(|o| is_completed(o)) {
    let day = order.created_at.date_naive();
    if day < start || day > end {
      continue;
    }
    stats.total_revenue_cents += order.final_amount_cents;
    stats.completed_orders += 1;
    *stats.revenue_by_date.entry(day).or_insert(0) += order.final_amount_cents;
  }
  if stats.completed_orders > 0 {
    stats.average_order_value_cents = stats.total_revenue_cents / stats.completed_orders;
  }
  Ok(stats)
}

/// Completed-order counts per product, highest first. Ties keep the order in
/// which products were first seen.
fn rank_products(orders: &[Order], titles: &HashMap<Uuid, String>, limit: usize) -> Vec<TopProduct> {
  let mut ranked: Vec<TopProduct> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();
  for order in orders.iter().filter(|o| is_completed(o)) {
    let Some(product_id) = order.product_id else {
      continue;
    };
    let slot = *index.entry(product_id).or_insert_with(|| {
      ranked.push(TopProduct {
        product_id,
        title: titles.get(&product_id).cloned().unwrap_or_default(),
        completed_orders: 0,
        revenue_cents: 0,
      });
      ranked.len() - 1
    });
    ranked[slot].completed_orders += 1;
    ranked[slot].revenue_cents += order.final_amount_cents;
  }
  ranked.sort_by(|a, b| b.completed_orders.cmp(&a.completed_orders));
  ranked.truncate(limit);
  ranked
}

impl AnalyticsService {
  pub fn new(users: Arc<dyn UserStore>, products: Arc<dyn ProductStore>, orders: Arc<dyn OrderStore>) -> Self {
    Self {
      users,
      products,
      orders,
    }
  }

  #[instrument(name = "analytics::dashboard", skip(self))]
  pub async fn dashboard(&self) -> ShopResult<DashboardStats> {
    let users = self.users.all_users().await?;
    let products = self.products.all_products().await?;
    let orders = self.orders.all_orders().await?;

    let mut stats = DashboardStats {
      total_users: users.len() as i64,
      total_products: products.len() as i64,
      total_orders: orders.len() as i64,
      total_revenue_cents: revenue_of(&orders),
      orders_last_7_days: count_since(&orders, Utc::now() - Duration::days(7)),
      ..Default::default()
    };
    for order in &orders {
      *stats.orders_by_status.entry(order.status.to_string()).or_insert(0) += 1;
    }
    Ok(stats)
  }

  /// Revenue of completed orders created between `start` and `end`, both
  /// inclusive.
  #[instrument(name = "analytics::revenue", skip(self))]
  pub async fn revenue(&self, start: NaiveDate, end: NaiveDate) -> ShopResult<RevenueStats> {
    let orders = self.orders.all_orders().await?;
    revenue_between(&orders, start, end)
  }

  #[instrument(name = "analytics::top_products", skip(self))]
  pub async fn top_products(&self, limit: i64) -> ShopResult<Vec<TopProduct>> {
    let limit = if limit < 1 {
      DEFAULT_PAGE_LIMIT
    } else {
      limit.min(MAX_PAGE_LIMIT)
    };
    let titles: HashMap<Uuid, String> = self
      .products
      .all_products()
      .await?
      .into_iter()
      .map(|p| (p.id, p.title))
      .collect();
    let orders = self.orders.all_orders().await?;
    Ok(rank_products(&orders, &titles, limit as usize))
  }

  pub async fn user_stats(&self) -> ShopResult<UserStats> {
    let users = self.users.all_users().await?;
    let since = Utc::now() - Duration::days(30);
    let mut stats = UserStats {
      total_users: users.len() as i64,
      new_users_last_30_days: users.iter().filter(|u| u.created_at >= since).count() as i64,
      ..Default::default()
    };
    for user in &users {
      *stats.users_by_role.entry(user.role.as_str().to_string()).or_insert(0) += 1;
    }
    Ok(stats)
  }

  pub async fn order_stats(&self) -> ShopResult<OrderStats> {
    let orders = self.orders.all_orders().await?;
    let mut stats = OrderStats {
      total_orders: orders.len() as i64,
      ..Default::default()
    };
    for order in &orders {
      *stats.orders_by_status.entry(order.status.to_string()).or_insert(0) += 1;
      *stats
        .orders_by_payment_status
        .entry(order.payment_status.to_string())
        .or_insert(0) += 1;
    }
    if stats.total_orders > 0 {
      let completed = orders.iter().filter(|o| is_completed(o)).count() as f64;
      stats.conversion_rate = completed / stats.total_orders as f64 * 100.0;
    }
    Ok(stats)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{OrderAmounts, PaymentStatus};
  use chrono::TimeZone;

  fn order(product_id: Uuid, cents: i64, status: OrderStatus, day: u32) -> Order {
    let amounts = OrderAmounts::new(cents, 1, 0).unwrap();
    let mut order = Order::new_product_order("ORD-T".into(), Uuid::new_v4(), product_id, 1, amounts, None);
    order.status = status;
    order.payment_status = if status == OrderStatus::Completed {
      PaymentStatus::Paid
    } else {
      PaymentStatus::Pending
    };
    order.created_at = Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap();
    order
  }

  #[test]
  fn revenue_counts_completed_orders_in_range() {
    let p = Uuid::new_v4();
    let orders = vec![
      order(p, 1000, OrderStatus::Completed, 1),
      order(p, 3000, OrderStatus::Completed, 2),
      order(p, 9000, OrderStatus::Pending, 2),
      order(p, 5000, OrderStatus::Completed, 20),
    ];
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let stats = revenue_between(&orders, start, end).unwrap();
    assert_eq!(stats.total_revenue_cents, 4000);
    assert_eq!(stats.completed_orders, 2);
    assert_eq!(stats.average_order_value_cents, 2000);
    assert_eq!(stats.revenue_by_date.get(&end), Some(&3000));
    assert!(revenue_between(&orders, end, start).is_err());
  }

  #[test]
  fn ranking_is_stable_and_descending() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let titles = HashMap::from([(a, "A".to_string()), (b, "B".to_string()), (c, "C".to_string())]);
    let orders = vec![
      order(a, 100, OrderStatus::Completed, 1),
      order(b, 100, OrderStatus::Completed, 1),
      order(c, 100, OrderStatus::Completed, 1),
      order(c, 100, OrderStatus::Completed, 2),
      order(a, 100, OrderStatus::Cancelled, 2),
    ];
    let ranked = rank_products(&orders, &titles, 10);
    let names: Vec<&str> = ranked.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
    assert_eq!(ranked[0].revenue_cents, 200);
    assert_eq!(rank_products(&orders, &titles, 1).len(), 1);
  }
}
