//! In-app notification entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// Unique identifier for a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A persisted in-app notification.
///
/// Created once; `read` only ever transitions from `false` to `true`, and
/// records are never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable record identifier, assigned by the store.
    pub id: NotificationId,
    /// Owner of the notification.
    pub user_id: UserId,
    /// Machine-readable notification kind, e.g. `review_requested`.
    pub kind: String,
    /// Short human-readable title.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// Opaque structured payload attached by the producing workflow.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Whether the owner has read the notification.
    pub read: bool,
    /// Creation time, assigned by the store.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Owner of the new notification.
    pub user_id: UserId,
    /// Machine-readable notification kind.
    pub kind: String,
    /// Short human-readable title.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// Optional structured payload; stored as an empty object when absent.
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}
