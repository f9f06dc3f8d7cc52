use super::trait_def::NotificationStore;
use crate::{Notification, NotificationId, StoreResult, StoredNotification};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of NotificationStore
///
/// Useful for testing and development. Data is lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryNotificationStore {
    notifications: Arc<RwLock<Vec<StoredNotification>>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn append(&self, notification: &Notification) -> StoreResult<NotificationId> {
        let stored = StoredNotification::new(notification.clone());
        let id = stored.id;

        self.notifications.write().await.push(stored);

        Ok(id)
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredNotification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().rev().cloned().collect())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.notifications.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn create_test_notification(seq: usize) -> Notification {
        Notification::new(
            "/event-listener/abc",
            BTreeMap::new(),
            json!({"id": format!("evt_{seq}"), "type": "payment_approved"}),
        )
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let store = MemoryNotificationStore::new();

        let id = store.append(&create_test_notification(0)).await.unwrap();
        let all = store.list_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].notification, create_test_notification(0));
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryNotificationStore::new();

        for seq in 0..5 {
            store.append(&create_test_notification(seq)).await.unwrap();
        }

        let all = store.list_all().await.unwrap();
        let ids: Vec<&str> = all
            .iter()
            .map(|s| s.notification.body["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["evt_4", "evt_3", "evt_2", "evt_1", "evt_0"]);
    }

    #[tokio::test]
    async fn test_duplicate_appends_are_kept() {
        let store = MemoryNotificationStore::new();
        let notification = create_test_notification(7);

        let first = store.append(&notification).await.unwrap();
        let second = store.append(&notification).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = MemoryNotificationStore::new();
        let handle = store.clone();

        handle.append(&create_test_notification(1)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
