//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry in the mounted view's
//! context and dispatched to the navigator or to background requests.

use crate::app::{App, AppEvent};
use crate::keybindings::Action as KbAction;
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{spawn_fetch, spawn_mark_all};
use super::Action;

/// Main input dispatch function.
///
/// Network work is spawned and reports back as [`AppEvent`]s on `event_tx`;
/// feed those to [`super::handle_app_event`].
pub fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Help overlay captures all keys while visible
    if app.show_help {
        return handle_help_input(app, code);
    }

    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, app.context())
    else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::SelectNext => {
            app.view.select_next();
        }
        KbAction::SelectPrevious => {
            app.view.select_previous();
        }
        KbAction::ViewSelected => {
            if let Some(url) = app.view.view_selected() {
                open_in_browser(app, &url);
            }
        }
        KbAction::MarkAllRead => {
            // Only the unread view yields ids; elsewhere the key is unbound anyway
            match app.view.bulk_mark_ids() {
                Some(ids) if ids.is_empty() => app.set_status("Nothing to mark read"),
                Some(ids) => {
                    app.set_status("Marking all read...");
                    spawn_mark_all(app, ids, event_tx);
                }
                None => {}
            }
        }
        KbAction::Refresh => {
            spawn_fetch(app, event_tx);
        }
        KbAction::SwitchView => {
            let next = app.view.kind().toggled();
            app.mount(next);
            spawn_fetch(app, event_tx);
        }
        KbAction::ShowHelp => {
            app.show_help = true;
        }
    }

    Action::Continue
}

/// Handle input while the help overlay is visible: Esc, q or ? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
        app.show_help = false;
    }
    Action::Continue
}

fn open_in_browser(app: &mut App, url: &str) {
    // SEC: Validate URL before open::that() to prevent launching arbitrary handlers
    match validate_url_for_open(url) {
        Err(e) => app.set_status(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(error = %e, url = %url, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }
}
