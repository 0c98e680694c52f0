// core/src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "notification_kind_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  Order,
  Payment,
  Download,
  Review,
  CustomOrder,
  System,
}

impl NotificationKind {
  /// Unknown labels fall back to `System`.
  pub fn from_label(label: &str) -> Self {
    match label {
      "order" => NotificationKind::Order,
      "payment" => NotificationKind::Payment,
      "download" => NotificationKind::Download,
      "review" => NotificationKind::Review,
      "custom_order" => NotificationKind::CustomOrder,
      _ => NotificationKind::System,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
  pub id: Uuid,
  pub user_id: Uuid,
  pub kind: NotificationKind,
  pub title: String,
  pub message: String,
  pub action_url: Option<String>,
  pub is_read: bool,
  pub read_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  #[serde(skip_serializing)]
  pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
  pub user_id: Uuid,
  pub kind: NotificationKind,
  pub title: String,
  pub message: String,
  pub action_url: Option<String>,
}

impl NewNotification {
  pub fn new(user_id: Uuid, kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      user_id,
      kind,
      title: title.into(),
      message: message.into(),
      action_url: None,
    }
  }

  pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
    self.action_url = Some(url.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_labels_become_system() {
    assert_eq!(NotificationKind::from_label("custom_order"), NotificationKind::CustomOrder);
    assert_eq!(NotificationKind::from_label("promo"), NotificationKind::System);
  }
}
