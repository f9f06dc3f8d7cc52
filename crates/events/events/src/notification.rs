//! Notification envelope types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identifier assigned to a notification when it is stored.
pub type NotificationId = uuid::Uuid;

/// An inbound provider notification.
///
/// The body is kept as an untyped JSON value; the provider's event schema is
/// not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Request path the notification arrived on.
    pub path: String,
    /// Request headers, keyed by lower-case name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Parsed request body.
    pub body: Value,
}

impl Notification {
    /// Creates a new notification.
    pub fn new(path: impl Into<String>, headers: BTreeMap<String, String>, body: Value) -> Self {
        Self {
            path: path.into(),
            headers,
            body,
        }
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The provider's event type (`body.type`), if present.
    pub fn event_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }
}

/// A notification with storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotification {
    /// Unique storage ID.
    pub id: NotificationId,
    /// When the notification was stored.
    pub received_at: DateTime<Utc>,
    /// The notification itself.
    pub notification: Notification,
}

impl StoredNotification {
    /// Wraps a notification with a fresh id and the current time.
    pub fn new(notification: Notification) -> Self {
        Self {
            id: NotificationId::new_v4(),
            received_at: Utc::now(),
            notification,
        }
    }
}
