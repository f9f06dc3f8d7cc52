use super::trait_def::NotificationStore;
use crate::{Notification, NotificationId, StoreError, StoreResult, StoredNotification};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSON-lines implementation of NotificationStore
///
/// Each stored notification is one line of compact JSON. Appends are
/// serialized through a mutex so lines from concurrent writers never
/// interleave; reads take the same lock so they never observe a half-written
/// line. Listing re-reads the whole file and reverses it.
pub struct JsonLinesStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Opens (creating if needed) the log file and its parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Self::truncate_torn_tail(&path).await?;

        tracing::debug!(path = %path.display(), "Opened notification log");

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Drops a partial final line left by an interrupted append, so the
    /// next record starts on its own line.
    async fn truncate_torn_tail(path: &Path) -> StoreResult<()> {
        let content = fs::read(path).await?;
        if content.is_empty() || content.ends_with(b"\n") {
            return Ok(());
        }

        let keep = content
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);

        tracing::warn!(
            path = %path.display(),
            dropped_bytes = content.len() - keep,
            "Truncating torn tail from notification log"
        );

        let file = OpenOptions::new().write(true).open(path).await?;
        file.set_len(keep as u64).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_lines(&self) -> StoreResult<Vec<StoredNotification>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                    line: idx + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl NotificationStore for JsonLinesStore {
    async fn append(&self, notification: &Notification) -> StoreResult<NotificationId> {
        let stored = StoredNotification::new(notification.clone());

        // Compact serialization escapes embedded newlines, so one record is
        // always exactly one line.
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;

        Ok(stored.id)
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredNotification>> {
        let _guard = self.lock.lock().await;
        let mut notifications = self.read_lines().await?;
        notifications.reverse();
        Ok(notifications)
    }
}
