//! When the client talks to the server about items.
//!
//! Refresh on startup, on view switch, on demand, and after a successful
//! bulk mark. Individual read-marks are fire-and-forget (see
//! [`super::ReadMarker`]). A failed bulk mark is surfaced to the caller and
//! the refetch is skipped, leaving local state as it was.
//!
//! These two calls are the only item traffic besides single reads. The UI
//! spawns them and hands the results to the mounted view on the event loop.
//!
//! Overlapping fetches are resolved by the caller: each fetch is tagged with
//! the generation of the view that started it and results for a stale
//! generation are dropped. Within one generation the last result applied wins.

use super::collection::CollectionKind;
use crate::api::{ApiError, ItemId, ItemRecord, ItemsApi};

/// Fetch the snapshot backing `kind`.
pub async fn load(api: &dyn ItemsApi, kind: CollectionKind) -> Result<Vec<ItemRecord>, ApiError> {
    let result = match kind {
        CollectionKind::Unread => api.get_unread_items().await,
        CollectionKind::Archived => api.get_archived_items().await,
    };
    match &result {
        Ok(records) => tracing::debug!(?kind, count = records.len(), "Items fetched"),
        Err(e) => tracing::warn!(?kind, error = %e, "Failed to fetch items"),
    }
    result
}

/// Issue one bulk mark-read for `ids`.
pub async fn bulk_mark(api: &dyn ItemsApi, ids: &[ItemId]) -> Result<(), ApiError> {
    tracing::info!(count = ids.len(), "Marking all items read");
    api.mark_all_read(ids).await.inspect_err(|e| {
        tracing::warn!(count = ids.len(), error = %e, "Bulk mark-read failed");
    })
}
