//! # Gateway Harness Events
//!
//! Storage for verified provider notifications:
//! - The opaque `Notification` envelope (path, headers, body)
//! - The `NotificationStore` contract: append, list newest first
//! - An append-only JSON-lines file store
//! - An in-memory store for tests and ephemeral runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use gateway_harness_events::{Notification, NotificationStore, JsonLinesStore};
//!
//! let store = JsonLinesStore::open("data/events.log").await?;
//!
//! store.append(&Notification::new("/event-listener/abc", headers, body)).await?;
//!
//! // Most recent activity first
//! let recent = store.list_all().await?;
//! ```

mod error;
mod notification;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use notification::{Notification, NotificationId, StoredNotification};
pub use store::{JsonLinesStore, MemoryNotificationStore, NotificationStore};
