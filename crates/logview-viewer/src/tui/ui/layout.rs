/*
[INPUT]:  Feed status, decode stats, metrics snapshot, current tab
[OUTPUT]: Status bar and tab bar rendered into Ratatui frame
[POS]:    TUI UI chrome (status and tabs)
[UPDATE]: When changing status text or tab set
*/

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use logview_adapter::FeedLocation;
use logview_viewer::{FeedMetricsSnapshot, FeedState, FeedStatus};

use crate::tui::app::Tab;
use crate::tui::runtime::{border_style, error_style, header_style};

pub(in crate::tui) fn draw_tabs(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    current_tab: Tab,
) {
    let titles = vec![Line::from("Records"), Line::from("Diagnostics")];
    let selected = match current_tab {
        Tab::Records => 0,
        Tab::Diagnostics => 1,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title("Tabs"),
        )
        .highlight_style(header_style())
        .select(selected);

    frame.render_widget(tabs, area);
}

pub(in crate::tui) fn draw_status_bar(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    location: &FeedLocation,
    feed: &FeedState,
    metrics: Option<&FeedMetricsSnapshot>,
    following: bool,
) {
    let line1 = Line::from(vec![
        Span::styled(
            "logview ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(location.to_string()),
        Span::raw("  "),
        status_span(feed),
    ]);

    let stats = feed.decode_stats();
    let mut counters = format!(
        "records {}  malformed {}  bytes {}",
        feed.len(),
        stats.malformed_lines,
        stats.bytes
    );
    if let Some(metrics) = metrics {
        counters.push_str(&format!(
            "  batches {}  largest {}  {:.0} rec/s  {:.1}s",
            metrics.batches,
            metrics.largest_batch,
            metrics.records_per_sec,
            metrics.elapsed.as_secs_f64()
        ));
    }
    counters.push_str(if following { "  follow on" } else { "  follow off" });
    let line2 = Line::from(Span::raw(counters));

    let widget = Paragraph::new(Text::from(vec![line1, line2])).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title("Feed"),
    );
    frame.render_widget(widget, area);
}

fn status_span(feed: &FeedState) -> Span<'static> {
    match feed.status() {
        FeedStatus::Loading => Span::styled("Loading logs...", Style::default().fg(Color::Yellow)),
        FeedStatus::Streaming => Span::styled("Streaming...", Style::default().fg(Color::Yellow)),
        FeedStatus::Complete if feed.is_empty() => {
            Span::styled("No logs available", Style::default().fg(Color::DarkGray))
        }
        FeedStatus::Complete => Span::styled("Complete", Style::default().fg(Color::LightGreen)),
        FeedStatus::Errored { reason } => {
            Span::styled(format!("Error loading logs: {reason}"), error_style())
        }
    }
}
