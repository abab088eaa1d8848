use crate::api::{ApiError, ItemId, ItemRecord, ItemsApi, PendingRequests};
use crate::items::{CollectionKind, Navigator, ReadMarker, Subscription};
use crate::keybindings::{Context, KeybindingRegistry};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

/// Shown after the TUI exits because the server rejected the session.
pub const RELOGIN_MESSAGE: &str = "Session expired. Run `tpr --login <NAME>` to log in again.";

// ============================================================================
// Event Types
// ============================================================================

/// Results reported back to the event loop by background tasks.
///
/// Item results carry the generation of the view that started the request.
/// A result whose generation no longer matches the mounted view is dropped.
#[derive(Debug)]
pub enum AppEvent {
    ItemsFetched {
        generation: u64,
        result: Result<Vec<ItemRecord>, ApiError>,
    },
    /// Bulk mark-read finished. `ids` are the ids that were sent.
    AllMarkedRead {
        generation: u64,
        ids: Vec<ItemId>,
        result: Result<(), ApiError>,
    },
    /// A fire-and-forget read mark for `id` was rejected. The item stays
    /// read locally.
    ReadMarkFailed { id: ItemId, error: ApiError },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "fetch", "mark_all_read")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

/// What the event handler should do after a bulk mark resolved.
#[derive(Debug, PartialEq, Eq)]
pub enum FollowUp {
    None,
    Refetch,
}

// ============================================================================
// Application State
// ============================================================================

/// All UI state. Only ever mutated on the event loop.
pub struct App {
    pub api: Arc<dyn ItemsApi>,
    marker: Arc<dyn ReadMarker>,
    /// In-flight request count, shared with the API client.
    pub pending: PendingRequests,
    pub keybindings: KeybindingRegistry,

    /// The mounted view. Replaced wholesale on every view switch.
    pub view: Navigator,
    /// Bumped on every mount so results for an unmounted view are dropped.
    pub view_generation: u64,
    /// Change feed of the mounted view's collection, used to trigger redraws.
    view_changes: Subscription,

    /// Logged-in user, for the title bar.
    pub user_name: Option<String>,

    // P-8: Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Whether the help overlay is currently displayed.
    pub show_help: bool,

    /// PERF-010: Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Busy state at the last render, to redraw when the indicator flips.
    pub last_busy: bool,

    /// Set when the loop must end with a message for the user.
    pub exit_message: Option<&'static str>,
}

impl App {
    pub fn new(
        api: Arc<dyn ItemsApi>,
        marker: Arc<dyn ReadMarker>,
        pending: PendingRequests,
        keybindings: KeybindingRegistry,
        start: CollectionKind,
    ) -> Self {
        let view = Navigator::new(start, Arc::clone(&marker));
        let view_changes = view.subscribe();
        Self {
            api,
            marker,
            pending,
            keybindings,
            view,
            view_generation: 0,
            view_changes,
            user_name: None,
            status_message: None,
            show_help: false,
            needs_redraw: true,
            last_busy: false,
            exit_message: None,
        }
    }

    /// Unmount the current view and mount a fresh, empty `kind` view.
    ///
    /// The caller is expected to start a fetch for the new generation.
    pub fn mount(&mut self, kind: CollectionKind) {
        self.view_generation = self.view_generation.wrapping_add(1);
        self.view = Navigator::new(kind, Arc::clone(&self.marker));
        // Dropping the old receiver unsubscribes from the old collection
        self.view_changes = self.view.subscribe();
        self.needs_redraw = true;
        tracing::debug!(?kind, generation = self.view_generation, "View mounted");
    }

    /// Keybinding context of the mounted view.
    pub fn context(&self) -> Context {
        match self.view.kind() {
            CollectionKind::Unread => Context::Unread,
            CollectionKind::Archived => Context::Archive,
        }
    }

    fn is_current(&self, generation: u64, what: &str) -> bool {
        if generation == self.view_generation {
            return true;
        }
        tracing::debug!(
            generation,
            current = self.view_generation,
            what,
            "Dropping result for unmounted view"
        );
        false
    }

    /// Install a fetch result for the mounted view.
    pub fn apply_items_fetched(
        &mut self,
        generation: u64,
        result: Result<Vec<ItemRecord>, ApiError>,
    ) {
        if !self.is_current(generation, "fetch") {
            return;
        }
        match result {
            Ok(records) => self.view.apply_fetched(records),
            Err(e) => self.report_error("Refresh failed", &e),
        }
    }

    /// Handle a finished bulk mark. On success the sent ids are flipped
    /// locally and a refetch is requested; on failure nothing changes.
    pub fn apply_all_marked(
        &mut self,
        generation: u64,
        ids: &[ItemId],
        result: Result<(), ApiError>,
    ) -> FollowUp {
        if !self.is_current(generation, "mark_all_read") {
            return FollowUp::None;
        }
        match result {
            Ok(()) => {
                self.view.apply_bulk_marked(ids);
                if !ids.is_empty() {
                    self.set_status(format!("Marked {} items read", ids.len()));
                }
                FollowUp::Refetch
            }
            Err(e) => {
                self.report_error("Mark all read failed", &e);
                FollowUp::None
            }
        }
    }

    /// Surface an API error. An expired session ends the TUI.
    pub fn report_error(&mut self, what: &str, error: &ApiError) {
        tracing::warn!(error = %error, what, "Request failed");
        match error {
            ApiError::SessionExpired | ApiError::NotLoggedIn => {
                self.exit_message = Some(RELOGIN_MESSAGE);
            }
            other => self.set_status(format!("{}: {}", what, other.status_text())),
        }
    }

    /// Whether the mounted collection published a change since the last call.
    pub fn take_view_change(&mut self) -> bool {
        match self.view_changes.has_changed() {
            Ok(true) => {
                let _ = self.view_changes.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.exit_message.is_some()
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::testing::{record, FakeApi, RecordingMarker};
    use crate::items::CursorState;
    use pretty_assertions::assert_eq;
    use tokio::time::{self, Duration};

    fn test_app(start: CollectionKind) -> (App, Arc<RecordingMarker>) {
        let marker = Arc::new(RecordingMarker::default());
        let app = App::new(
            Arc::new(FakeApi::default()),
            marker.clone(),
            PendingRequests::new(),
            KeybindingRegistry::new(),
            start,
        );
        (app, marker)
    }

    fn http_error() -> ApiError {
        ApiError::Http {
            status: 500,
            body: "database down".to_string(),
        }
    }

    #[test]
    fn test_fetch_result_populates_view() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        app.apply_items_fetched(0, Ok(vec![record(1, "a"), record(2, "b")]));
        assert_eq!(app.view.collection().ids(), vec![1, 2]);
        assert_eq!(app.view.cursor().state(), CursorState::Positioned(0));
        assert!(app.take_view_change());
        assert!(!app.take_view_change());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        let stale = app.view_generation;
        app.mount(CollectionKind::Archived);

        app.apply_items_fetched(stale, Ok(vec![record(1, "a")]));
        assert!(app.view.collection().is_empty());
        assert!(!app.take_view_change());
    }

    #[test]
    fn test_mount_switches_context() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        assert_eq!(app.context(), Context::Unread);
        app.mount(CollectionKind::Archived);
        assert_eq!(app.context(), Context::Archive);
        assert_eq!(app.view_generation, 1);
    }

    #[test]
    fn test_fetch_error_sets_status_and_keeps_items() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        app.apply_items_fetched(0, Ok(vec![record(1, "a")]));
        app.apply_items_fetched(0, Err(http_error()));

        assert_eq!(app.view.collection().ids(), vec![1]);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Refresh failed: database down (500)");
        assert!(!app.should_quit());
    }

    #[test]
    fn test_session_expiry_requests_exit() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        app.apply_items_fetched(0, Err(ApiError::SessionExpired));
        assert!(app.should_quit());
        assert_eq!(app.exit_message, Some(RELOGIN_MESSAGE));
    }

    #[test]
    fn test_bulk_success_requests_refetch() {
        let (mut app, marker) = test_app(CollectionKind::Unread);
        app.apply_items_fetched(0, Ok(vec![record(1, "a"), record(2, "b")]));

        let follow_up = app.apply_all_marked(0, &[1, 2], Ok(()));
        assert_eq!(follow_up, FollowUp::Refetch);
        assert_eq!(app.view.collection().unread_count(), 0);
        assert!(marker.marked().is_empty());
    }

    #[test]
    fn test_bulk_failure_skips_refetch() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        app.apply_items_fetched(0, Ok(vec![record(1, "a")]));
        let version = app.view.collection().version();

        let follow_up = app.apply_all_marked(0, &[1], Err(http_error()));
        assert_eq!(follow_up, FollowUp::None);
        assert_eq!(app.view.collection().version(), version);
        assert_eq!(app.view.collection().unread_count(), 1);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_empty_bulk_success_sets_no_count_message() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        assert_eq!(app.apply_all_marked(0, &[], Ok(())), FollowUp::Refetch);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_stale_bulk_result_is_ignored() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        app.mount(CollectionKind::Archived);
        assert_eq!(app.apply_all_marked(0, &[1], Ok(())), FollowUp::None);
    }

    // Status message expiry with time control
    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let (mut app, _) = test_app(CollectionKind::Unread);
        time::pause();
        app.set_status("Test message");
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
