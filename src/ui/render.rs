//! Render functions for the TUI.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{help, item_list, status};

/// Minimum terminal dimensions required for normal operation.
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 6;

/// Main render dispatch function.
///
/// Takes `&mut App` so the list can record its viewport height for
/// scroll-into-view.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(f, app, chunks[0]);
    item_list::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f, app);
    }
}

fn render_title(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let collection = app.view.collection();
    let mut spans = vec![Span::styled(
        " tpr ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(format!(
        " {} ({})",
        app.view.kind().label(),
        collection.len()
    )));
    if let Some(name) = &app.user_name {
        spans.push(Span::styled(
            format!("  {}", name),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PendingRequests;
    use crate::items::testing::{record, FakeApi, RecordingMarker};
    use crate::items::CollectionKind;
    use crate::keybindings::KeybindingRegistry;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        App::new(
            Arc::new(FakeApi::default()),
            Arc::new(RecordingMarker::default()),
            PendingRequests::new(),
            KeybindingRegistry::new(),
            CollectionKind::Unread,
        )
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_renders_items_and_title() {
        let mut app = app();
        app.apply_items_fetched(0, Ok(vec![record(1, "First post"), record(2, "Second post")]));

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Unread (2)"));
        assert!(text.contains("First post"));
        assert!(text.contains("Second post"));
    }

    #[test]
    fn test_empty_collection_placeholder() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("No unread items"));
    }

    #[test]
    fn test_busy_indicator() {
        let mut app = app();
        let _guard = app.pending.begin();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Working..."));
    }

    #[test]
    fn test_small_terminal_message() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Terminal too small"));
    }

    #[test]
    fn test_render_records_viewport_for_scrolling() {
        let mut app = app();
        let records = (1..=20).map(|i| record(i, "post")).collect();
        app.apply_items_fetched(0, Ok(records));

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();

        // 10 rows - title - status - 2 borders
        for _ in 0..6 {
            app.view.select_next();
        }
        assert_eq!(app.view.cursor().scroll_offset(), 1);
    }
}
