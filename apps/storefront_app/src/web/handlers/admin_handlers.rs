// apps/storefront_app/src/web/handlers/admin_handlers.rs

//! Back-office endpoints. Every handler here takes an [`AdminUser`], so a
//! non-admin token is rejected before any service is called.

use actix_web::{web, HttpResponse};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use storefront::models::{CustomOrderStatus, OrderStatus, PageRequest, ProcessCustomOrder};
use storefront::services::AdminUserUpdate;
use tracing::{info, instrument};
use uuid::Uuid;

use super::message;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
  #[serde(default)]
  pub page: i64,
  #[serde(default)]
  pub limit: i64,
  pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CustomOrderListQuery {
  #[serde(default)]
  pub page: i64,
  #[serde(default)]
  pub limit: i64,
  pub status: Option<CustomOrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReasonPayload {
  #[serde(default)]
  pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
  #[serde(default)]
  pub limit: i64,
}

// --- Orders & payments ---

#[instrument(name = "handler::admin_list_orders", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_orders(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let page = app_state
    .services
    .orders
    .list_all_orders(PageRequest::new(query.page, query.limit), query.status)
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::approve_payment", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn approve_payment(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .services
    .orders
    .approve_payment(admin.0, path.into_inner())
    .await?;
  info!(order_id = %order.id, "Payment approved.");
  Ok(HttpResponse::Ok().json(json!({ "message": "payment approved", "order": order })))
}

#[instrument(name = "handler::reject_payment", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn reject_payment(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<ReasonPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .services
    .orders
    .reject_payment(admin.0, path.into_inner(), &body.reason)
    .await?;
  info!(order_id = %order.id, "Payment rejected.");
  Ok(HttpResponse::Ok().json(json!({ "message": "payment rejected", "order": order })))
}

#[instrument(name = "handler::refund_order", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn refund_order(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<ReasonPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .services
    .orders
    .refund_order(admin.0, path.into_inner(), &body.reason)
    .await?;
  info!(order_id = %order.id, "Order refunded.");
  Ok(HttpResponse::Ok().json(json!({ "message": "order refunded", "order": order })))
}

#[instrument(name = "handler::pending_transactions", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn pending_transactions(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state
    .services
    .orders
    .list_pending_transactions(query.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

// --- Custom orders ---

#[instrument(name = "handler::admin_list_custom_orders", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_custom_orders(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<CustomOrderListQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let page = app_state
    .services
    .custom_orders
    .list_all(PageRequest::new(query.page, query.limit), query.status)
    .await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::process_custom_order", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id, status = %body.status))]
pub async fn process_custom_order(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<ProcessCustomOrder>,
) -> Result<HttpResponse, AppError> {
  let request = app_state
    .services
    .custom_orders
    .process(admin.0, path.into_inner(), body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(request))
}

#[instrument(name = "handler::complete_custom_order", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn complete_custom_order(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let request = app_state
    .services
    .custom_orders
    .complete(admin.0, path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(request))
}

// --- Users ---

#[instrument(name = "handler::admin_list_users", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_users(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  query: web::Query<PageRequest>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.services.users.list_users(admin.0, query.into_inner()).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::admin_get_user", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn get_user(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let user = app_state.services.users.get_user(admin.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::admin_update_user", skip(app_state, admin, body), fields(admin_id = %admin.0.user_id))]
pub async fn update_user(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  body: web::Json<AdminUserUpdate>,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .services
    .users
    .update_user(admin.0, path.into_inner(), body.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::admin_delete_user", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn delete_user(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.users.delete_user(admin.0, path.into_inner()).await?;
  Ok(message("user deleted"))
}

// --- Reviews ---

#[instrument(name = "handler::admin_delete_review", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn delete_review(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.services.reviews.admin_delete(admin.0, path.into_inner()).await?;
  Ok(message("review deleted"))
}

// --- Analytics ---

#[instrument(name = "handler::dashboard", skip(app_state, _admin))]
pub async fn dashboard(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let stats = app_state.services.analytics.dashboard().await?;
  Ok(HttpResponse::Ok().json(stats))
}

/// Defaults to the trailing 30 days when either bound is missing.
#[instrument(name = "handler::revenue", skip(app_state, _admin))]
pub async fn revenue(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  query: web::Query<RevenueQuery>,
) -> Result<HttpResponse, AppError> {
  let today = Utc::now().date_naive();
  let end = query.end_date.unwrap_or(today);
  let start = query.start_date.unwrap_or(end - Duration::days(30));
  let stats = app_state.services.analytics.revenue(start, end).await?;
  Ok(HttpResponse::Ok().json(stats))
}

#[instrument(name = "handler::top_products", skip(app_state, _admin))]
pub async fn top_products(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  query: web::Query<TopProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.services.analytics.top_products(query.limit).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::user_stats", skip(app_state, _admin))]
pub async fn user_stats(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let stats = app_state.services.analytics.user_stats().await?;
  Ok(HttpResponse::Ok().json(stats))
}

#[instrument(name = "handler::order_stats", skip(app_state, _admin))]
pub async fn order_stats(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let stats = app_state.services.analytics.order_stats().await?;
  Ok(HttpResponse::Ok().json(stats))
}
