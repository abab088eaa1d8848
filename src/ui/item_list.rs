use crate::app::App;
use crate::items::{CollectionKind, Item};
use crate::util::{display_width, format_relative_time, sanitize_line, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Width reserved for the age column, including padding.
const AGE_WIDTH: usize = 8;
/// Feed name column cap.
const FEED_WIDTH: usize = 18;

/// Render the item list for the mounted view.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let inner_rows = area.height.saturating_sub(2) as usize;
    app.view.set_viewport_rows(inner_rows);

    let view = &app.view;
    let collection = view.collection();
    let now = Utc::now();
    let inner_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if collection.is_empty() {
        let placeholder = match view.kind() {
            CollectionKind::Unread => "No unread items",
            CollectionKind::Archived => "No archived items",
        };
        vec![ListItem::new(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        collection
            .items()
            .iter()
            .map(|item| ListItem::new(item_line(item, view.kind(), inner_width, now)))
            .collect()
    };

    let mut state = ListState::default()
        .with_offset(view.cursor().scroll_offset())
        .with_selected(view.cursor().selected_index());

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(view.kind().label()),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    f.render_stateful_widget(list, area, &mut state);
}

fn item_line(item: &Item, kind: CollectionKind, width: usize, now: DateTime<Utc>) -> Line<'static> {
    let age = format_relative_time(item.publication_time, now);
    let feed = truncate_to_width(&sanitize_line(&item.feed_name), FEED_WIDTH).into_owned();
    // Pad by display width, not byte length, so wide glyphs line up
    let feed_cell = format!(
        "{}{} ",
        feed,
        " ".repeat(FEED_WIDTH.saturating_sub(display_width(&feed)))
    );

    let title_width = width
        .saturating_sub(display_width(&feed_cell))
        .saturating_sub(AGE_WIDTH);
    let title = truncate_to_width(&sanitize_line(&item.title), title_width).into_owned();
    let padding = title_width.saturating_sub(display_width(&title));

    // Read items in the unread queue are dimmed until the next refetch drops them
    let title_style = if kind == CollectionKind::Unread && !item.is_read() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Line::from(vec![
        Span::styled(feed_cell, Style::default().fg(Color::Cyan)),
        Span::styled(title, title_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(
            format!("{:>width$}", age, width = AGE_WIDTH),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}
