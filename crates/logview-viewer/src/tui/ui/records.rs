/*
[INPUT]:  FeedState records, WindowState, selected index
[OUTPUT]: Windowed Time | Event table with scrollbar, or a placeholder
[POS]:    TUI UI records table rendering
[UPDATE]: When changing columns, time formatting, or empty/loading states
*/

use ratatui::layout::{Alignment, Constraint, Margin};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
    TableState, Wrap,
};
use serde_json::Value;

use logview_adapter::Record;
use logview_viewer::{FeedState, FeedStatus, WindowState};

use crate::tui::runtime::{border_style, error_style, header_style};

const TIME_COLUMN_WIDTH: u16 = 24;

pub(in crate::tui) fn draw_records(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    feed: &FeedState,
    window: &mut WindowState,
    selected: Option<usize>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(format!("Records ({})", feed.len()));

    if feed.is_empty() {
        let (text, style) = placeholder(feed.status());
        let widget = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    // Borders and header row take three lines.
    window.set_viewport_extent(u64::from(area.height.saturating_sub(3)));
    let count = feed.len();
    let layout = window.layout(count);
    let visible = window.visible_rows(count);
    let row_height = u16::try_from(window.row_extent()).unwrap_or(u16::MAX);

    let rows = feed.records()[layout.range.as_range()]
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(format_time(record)),
                Cell::from(record.to_compact_json()),
            ])
            .height(row_height)
        })
        .collect::<Vec<_>>();

    let mut state = TableState::default().with_offset(visible.start.saturating_sub(layout.range.start));
    if let Some(index) = selected.filter(|index| visible.contains(*index)) {
        state.select(Some(index - layout.range.start));
    }

    let header = Row::new(vec![Cell::from("Time"), Cell::from("Event")]).style(header_style());
    let table = Table::new(
        rows,
        [Constraint::Length(TIME_COLUMN_WIDTH), Constraint::Min(10)],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut state);

    let mut scrollbar_state = ScrollbarState::new(window.max_scroll(count) as usize + 1)
        .position(window.scroll_offset() as usize)
        .viewport_content_length(window.viewport_extent() as usize);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

fn placeholder(status: &FeedStatus) -> (String, Style) {
    match status {
        FeedStatus::Loading | FeedStatus::Streaming => {
            ("Loading logs...".to_string(), Style::default())
        }
        FeedStatus::Complete => (
            "No logs available".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        FeedStatus::Errored { reason } => (format!("Error loading logs: {reason}"), error_style()),
    }
}

/// `_time` as ISO-8601 UTC with milliseconds, or the raw value when unparseable.
pub(in crate::tui) fn format_time(record: &Record) -> String {
    if let Some(timestamp) = record.timestamp() {
        return timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    }
    match record.raw_time() {
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
