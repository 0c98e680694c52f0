// core/src/services/notification_service.rs

use crate::error::{ShopError, ShopResult};
use crate::models::{NewNotification, Notification, NotificationKind, Page, PageRequest};
use crate::store::NotificationStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const NOTIFICATION_PAGE_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct NotificationService {
  store: Arc<dyn NotificationStore>,
}

impl NotificationService {
  pub fn new(store: Arc<dyn NotificationStore>) -> Self {
    Self { store }
  }

  #[instrument(name = "notifications::notify", skip_all, fields(user_id = %new.user_id, kind = ?new.kind))]
  pub async fn notify(&self, new: NewNotification) -> ShopResult<Notification> {
    if new.title.trim().is_empty() {
      return Err(ShopError::validation("title is required"));
    }
    if new.message.trim().is_empty() {
      return Err(ShopError::validation("message is required"));
    }

    let notification = Notification {
      id: Uuid::new_v4(),
      user_id: new.user_id,
      kind: new.kind,
      title: new.title,
      message: new.message,
      action_url: new.action_url,
      is_read: false,
      read_at: None,
      created_at: Utc::now(),
      deleted_at: None,
    };
    self.store.insert_notification(&notification).await?;
    debug!(notification_id = %notification.id, "Notification created.");
    Ok(notification)
  }

  /// Creates a notification from a free-form type label. Unknown labels are
  /// filed as `system`.
  pub async fn create(
    &self,
    user_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
    action_url: Option<String>,
  ) -> ShopResult<Notification> {
    let mut new = NewNotification::new(user_id, NotificationKind::from_label(kind), title, message);
    new.action_url = action_url;
    self.notify(new).await
  }

  pub async fn list(&self, user_id: Uuid, page: PageRequest) -> ShopResult<Page<Notification>> {
    self
      .store
      .list_notifications(user_id, page.normalized(NOTIFICATION_PAGE_LIMIT))
      .await
  }

  pub async fn unread(&self, user_id: Uuid) -> ShopResult<Vec<Notification>> {
    self.store.list_unread(user_id).await
  }

  async fn owned(&self, user_id: Uuid, id: Uuid) -> ShopResult<Notification> {
    let notification = self
      .store
      .find_notification(id)
      .await?
      .ok_or_else(|| ShopError::not_found("notification not found"))?;
    if notification.user_id != user_id {
      return Err(ShopError::unauthorized("unauthorized"));
    }
    Ok(notification)
  }

  #[instrument(name = "notifications::mark_read", skip(self))]
  pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> ShopResult<()> {
    let notification = self.owned(user_id, id).await?;
    if notification.is_read {
      return Ok(());
    }
    self.store.mark_read(id, Utc::now()).await
  }

  pub async fn mark_all_read(&self, user_id: Uuid) -> ShopResult<u64> {
    let changed = self.store.mark_all_read(user_id, Utc::now()).await?;
    debug!(%user_id, changed, "Marked notifications read.");
    Ok(changed)
  }

  #[instrument(name = "notifications::delete", skip(self))]
  pub async fn delete(&self, user_id: Uuid, id: Uuid) -> ShopResult<()> {
    self.owned(user_id, id).await?;
    self.store.soft_delete_notification(id).await
  }
}
