use crate::api::{ItemId, ItemRecord, ItemsApi};
use crate::app::AppEvent;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Commits an item's read-transition to the server.
///
/// Fire-and-forget: callers never wait on or observe the outcome. A stricter
/// implementation (retry, backoff) can be dropped in without touching the
/// cursor logic.
pub trait ReadMarker: Send + Sync {
    fn mark_read(&self, id: ItemId);
}

/// [`ReadMarker`] that spawns `DELETE /api/items/unread/{id}` on the tokio
/// runtime.
///
/// The item is never rolled back. Failures are reported to the event loop as
/// [`AppEvent::ReadMarkFailed`] so an expired session still ends the TUI.
///
/// Must be used from inside a tokio runtime.
pub struct SpawnedReadMarker {
    api: Arc<dyn ItemsApi>,
    events: mpsc::Sender<AppEvent>,
}

impl SpawnedReadMarker {
    pub fn new(api: Arc<dyn ItemsApi>, events: mpsc::Sender<AppEvent>) -> Self {
        Self { api, events }
    }
}

impl ReadMarker for SpawnedReadMarker {
    fn mark_read(&self, id: ItemId) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(error) = api.mark_item_read(id).await {
                // The item already left the queue locally; the server keeps it unread
                tracing::warn!(item_id = id, error = %error, "Failed to mark item read");
                if events
                    .send(AppEvent::ReadMarkFailed { id, error })
                    .await
                    .is_err()
                {
                    tracing::debug!(item_id = id, "Event loop gone, dropping read failure");
                }
            }
        });
    }
}

/// One article in a collection.
///
/// `is_read` only ever goes false → true, and at most one request is issued
/// per instance.
#[derive(Debug, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub url: String,
    pub feed_name: String,
    pub publication_time: DateTime<Utc>,
    is_read: bool,
}

impl Item {
    /// Materialize an unread item from a server record.
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            url: record.url,
            feed_name: record.feed_name,
            publication_time: DateTime::from_timestamp(record.publication_time, 0)
                .unwrap_or_default(),
            is_read: false,
        }
    }

    /// Materialize an archived item; always read.
    pub fn archived(record: ItemRecord) -> Self {
        let mut item = Self::from_record(record);
        item.is_read = true;
        item
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// Commit this item as read.
    ///
    /// Flips the flag optimistically and asks `marker` to tell the server.
    /// No-op if already read.
    pub fn mark_read(&mut self, marker: &dyn ReadMarker) {
        if self.is_read {
            return;
        }
        marker.mark_read(self.id);
        self.is_read = true;
        tracing::debug!(item_id = self.id, "Item committed as read");
    }

    /// Flip to read without a request. For items covered by an acknowledged
    /// bulk mark.
    pub fn assume_read(&mut self) {
        self.is_read = true;
    }
}
