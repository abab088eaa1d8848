use crate::app::App;
use crate::items::CollectionKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let busy = app.pending.is_busy();

    // Use Cow to avoid allocations for static strings and borrowed status messages
    let text: Cow<'_, str> = if busy {
        Cow::Borrowed("Working...")
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.view.kind() {
            CollectionKind::Unread => Cow::Borrowed(
                "[j/k]move [v]iew [A]ll read [r]efresh [Tab]archive [?]help [q]uit",
            ),
            CollectionKind::Archived => {
                Cow::Borrowed("[j/k]move [v]iew [r]efresh [Tab]unread [?]help [q]uit")
            }
        }
    };

    let mut style = Style::default().bg(Color::DarkGray).fg(Color::White);
    if busy {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }

    f.render_widget(Paragraph::new(text).style(style), area);
}
