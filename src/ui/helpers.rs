//! Helper functions for UI operations.
//!
//! Background request spawning and panic containment shared by the input
//! and event handlers.

use crate::api::ItemId;
use crate::app::{App, AppEvent};
use crate::items::sync;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing, panics are converted to
/// `Err(String)` containing the panic message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Fetch the mounted view's collection in the background.
///
/// The result is tagged with the current view generation.
pub(super) fn spawn_fetch(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let api = Arc::clone(&app.api);
    let kind = app.view.kind();
    let generation = app.view_generation;
    let tx = event_tx.clone();

    tracing::debug!(?kind, generation, "Spawning item fetch");

    tokio::spawn(async move {
        let outcome = catch_task_panic(sync::load(api.as_ref(), kind)).await;
        match outcome {
            Ok(result) => {
                send_event(&tx, AppEvent::ItemsFetched { generation, result }, "ItemsFetched")
                    .await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Fetch task panicked");
                send_event(&tx, AppEvent::TaskPanicked { task: "fetch", error }, "TaskPanicked")
                    .await;
            }
        }
    });
}

/// Send one bulk mark-read for `ids` in the background.
pub(super) fn spawn_mark_all(app: &App, ids: Vec<ItemId>, event_tx: &mpsc::Sender<AppEvent>) {
    let api = Arc::clone(&app.api);
    let generation = app.view_generation;
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let outcome = catch_task_panic(sync::bulk_mark(api.as_ref(), &ids)).await;
        match outcome {
            Ok(result) => {
                let event = AppEvent::AllMarkedRead {
                    generation,
                    ids,
                    result,
                };
                send_event(&tx, event, "AllMarkedRead").await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Mark-all task panicked");
                let event = AppEvent::TaskPanicked {
                    task: "mark_all_read",
                    error,
                };
                send_event(&tx, event, "TaskPanicked").await;
            }
        }
    });
}
