//! Notification Store - persistence layer for verified notifications
//!
//! Provides:
//! - Append-only persistence of notifications
//! - Newest-first listing
//! - A JSON-lines file backend and an in-memory backend

mod file;
mod memory;
mod trait_def;

pub use file::JsonLinesStore;
pub use memory::MemoryNotificationStore;
pub use trait_def::NotificationStore;
