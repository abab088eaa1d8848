//! Background task event processing.
//!
//! Applies results reported by spawned requests to the App, on the event
//! loop, one event at a time.

use crate::app::{App, AppEvent, FollowUp};
use tokio::sync::mpsc;

use super::helpers::spawn_fetch;

/// Apply one background result. May spawn follow-up work on `event_tx`.
pub fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::ItemsFetched { generation, result } => {
            app.apply_items_fetched(generation, result);
        }
        AppEvent::AllMarkedRead {
            generation,
            ids,
            result,
        } => {
            // Second phase: the refetch is authoritative
            if app.apply_all_marked(generation, &ids, result) == FollowUp::Refetch {
                spawn_fetch(app, event_tx);
            }
        }
        AppEvent::ReadMarkFailed { id, error } => {
            tracing::debug!(item_id = id, "Read mark rejected");
            app.report_error("Mark read failed", &error);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}
