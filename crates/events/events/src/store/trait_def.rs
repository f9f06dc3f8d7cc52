use crate::{Notification, NotificationId, StoreResult, StoredNotification};
use async_trait::async_trait;

/// Trait for notification storage.
///
/// Implementations must keep insertion order: `list_all` returns the most
/// recently appended notification first. Concurrent appends must not corrupt
/// the backing medium; a `list_all` racing an append may or may not observe
/// it.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Append a notification to the store
    ///
    /// # Returns
    ///
    /// The unique ID assigned to the stored notification. Appending the same
    /// notification twice stores two records.
    async fn append(&self, notification: &Notification) -> StoreResult<NotificationId>;

    /// All stored notifications, newest first
    async fn list_all(&self) -> StoreResult<Vec<StoredNotification>>;

    /// Number of stored notifications
    async fn count(&self) -> StoreResult<usize> {
        Ok(self.list_all().await?.len())
    }
}
