// core/src/services/custom_order_service.rs

//! Bespoke work requests. These run on their own status vocabulary and never
//! touch the order/transaction pair.

use super::NotificationService;
use crate::auth::Identity;
use crate::error::{ShopError, ShopResult};
use crate::models::{
  CustomOrder, CustomOrderStatus, NewCustomOrder, NewNotification, NotificationKind, Page, PageRequest,
  ProcessCustomOrder,
};
use crate::store::CustomOrderStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const CUSTOM_ORDER_PAGE_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct CustomOrderService {
  store: Arc<dyn CustomOrderStore>,
  notifications: NotificationService,
}

impl CustomOrderService {
  pub fn new(store: Arc<dyn CustomOrderStore>, notifications: NotificationService) -> Self {
    Self { store, notifications }
  }

  #[instrument(name = "custom_orders::create", skip(self, req))]
  pub async fn create(&self, user_id: Uuid, req: NewCustomOrder) -> ShopResult<CustomOrder> {
    if req.title.trim().is_empty() {
      return Err(ShopError::validation("title is required"));
    }
    if req.description.trim().is_empty() {
      return Err(ShopError::validation("description is required"));
    }
    if req.budget_cents < 0 {
      return Err(ShopError::validation("budget must not be negative"));
    }

    let now = Utc::now();
    let custom_order = CustomOrder {
      id: Uuid::new_v4(),
      order_id: None,
      user_id,
      title: req.title.trim().to_string(),
      description: req.description,
      requirements: req.requirements,
      budget_min_cents: req.budget_cents,
      budget_max_cents: req.budget_cents,
      deadline: None,
      status: CustomOrderStatus::Pending,
      admin_notes: None,
      quote_amount_cents: None,
      agreed_amount_cents: None,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };
    self.store.insert_custom_order(&custom_order).await?;
    info!(custom_order_id = %custom_order.id, "Custom order submitted.");
    Ok(custom_order)
  }

  pub async fn list_mine(&self, user_id: Uuid) -> ShopResult<Vec<CustomOrder>> {
    self.store.list_user_custom_orders(user_id).await
  }

  async fn find(&self, id: Uuid) -> ShopResult<CustomOrder> {
    self
      .store
      .find_custom_order(id)
      .await?
      .ok_or_else(|| ShopError::not_found("custom order not found"))
  }

  pub async fn get(&self, identity: Identity, id: Uuid) -> ShopResult<CustomOrder> {
    let custom_order = self.find(id).await?;
    if !identity.can_access(custom_order.user_id) {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    Ok(custom_order)
  }

  pub async fn cancel(&self, user_id: Uuid, id: Uuid) -> ShopResult<CustomOrder> {
    let mut custom_order = self.find(id).await?;
    if custom_order.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    if custom_order.status.is_closed() {
      return Err(ShopError::invalid_state("custom order cannot be cancelled"));
    }
    custom_order.status = CustomOrderStatus::Cancelled;
    custom_order.updated_at = Utc::now();
    self.store.update_custom_order(&custom_order).await?;
    Ok(custom_order)
  }

  pub async fn list_all(
    &self,
    page: PageRequest,
    status: Option<CustomOrderStatus>,
  ) -> ShopResult<Page<CustomOrder>> {
    self
      .store
      .list_custom_orders(page.normalized(CUSTOM_ORDER_PAGE_LIMIT), status)
      .await
  }

  /// Admin review step: moves the request through its statuses, records a
  /// quote and sets a deadline from the estimate.
  #[instrument(name = "custom_orders::process", skip(self, req), fields(admin_id = %admin.user_id))]
  pub async fn process(&self, admin: Identity, id: Uuid, req: ProcessCustomOrder) -> ShopResult<CustomOrder> {
    admin.require_admin()?;
    let mut custom_order = self.find(id).await?;
    if custom_order.status.is_closed() {
      return Err(ShopError::invalid_state("cannot process a completed or cancelled custom order"));
    }

    let status: CustomOrderStatus = req.status.trim().parse()?;
    if let Some(quote) = req.quote_amount_cents {
      if quote < 0 {
        return Err(ShopError::validation("quote amount must not be negative"));
      }
      custom_order.quote_amount_cents = Some(quote);
    }
    if let Some(days) = req.estimated_days {
      if days < 0 {
        return Err(ShopError::validation("estimated days must not be negative"));
      }
      custom_order.deadline = Some(Utc::now() + Duration::days(days));
    }
    if !req.admin_notes.trim().is_empty() {
      custom_order.admin_notes = Some(req.admin_notes);
    }
    custom_order.status = status;
    custom_order.updated_at = Utc::now();
    self.store.update_custom_order(&custom_order).await?;
    info!(custom_order_id = %custom_order.id, status = ?custom_order.status, "Custom order processed.");

    let notification = NewNotification::new(
      custom_order.user_id,
      NotificationKind::CustomOrder,
      "Custom order updated",
      format!("Your request \"{}\" has been updated.", custom_order.title),
    )
    .with_action_url(format!("/custom-orders/{}", custom_order.id));
    if let Err(e) = self.notifications.notify(notification).await {
      warn!(custom_order_id = %custom_order.id, error = %e, "Failed to notify requester.");
    }
    Ok(custom_order)
  }

  #[instrument(name = "custom_orders::complete", skip(self), fields(admin_id = %admin.user_id))]
  pub async fn complete(&self, admin: Identity, id: Uuid) -> ShopResult<CustomOrder> {
    admin.require_admin()?;
    let mut custom_order = self.find(id).await?;
    if custom_order.status.is_closed() {
      return Err(ShopError::invalid_state("custom order is already completed or cancelled"));
    }
    custom_order.status = CustomOrderStatus::Completed;
    if custom_order.agreed_amount_cents.is_none() {
      custom_order.agreed_amount_cents = custom_order.quote_amount_cents;
    }
    custom_order.updated_at = Utc::now();
    self.store.update_custom_order(&custom_order).await?;
    Ok(custom_order)
  }
}
