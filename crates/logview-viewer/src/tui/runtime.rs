/*
[INPUT]:  Feed transport, feed location, viewer config, log buffer, shutdown token
[OUTPUT]: Ratatui-based TUI run loop, frame-driven batch flushing, and rendering
[POS]:    TUI runtime loop and shared style helpers
[UPDATE]: When changing TUI layout, keybindings, or the frame loop
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use logview_adapter::{FeedLocation, FeedTransport};
use logview_viewer::{FeedController, FrameQueue, LogBufferHandle, ViewerConfig};

use super::app::{AppState, Tab};
use super::events::{handle_key_event, handle_mouse_event};
use super::terminal::{TerminalGuard, TerminalOptions};
use super::ui::*;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);

enum UiEvent {
    Input(CrosstermEvent),
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn error_style() -> Style {
    Style::default()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD)
}

pub async fn run_tui(
    transport: Arc<dyn FeedTransport>,
    location: FeedLocation,
    config: &ViewerConfig,
    log_buffer: LogBufferHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut terminal = TerminalGuard::new(TerminalOptions::from_config(config))?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = event_tx.send(UiEvent::Input(event));
                }
            }
        }
    });

    // Batch flushes run on this loop's frames, right before each draw.
    let frames = FrameQueue::new();
    let controller = FeedController::new(transport, Arc::new(frames.clone()));
    let mut app = AppState::new(controller, frames, location, config, log_buffer);
    info!(location = %app.location, "tui started");

    let mut tick = tokio::time::interval(config.frame_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = shutdown.cancelled() => {
                should_quit = true;
            }
            _ = tick.tick() => {
                app.frames.run_frame();
            }
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(UiEvent::Input(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        should_quit = handle_key_event(&mut app, key);
                    }
                    Some(UiEvent::Input(CrosstermEvent::Mouse(mouse))) => {
                        handle_mouse_event(&mut app, mouse);
                    }
                    Some(_) => {}
                    None => should_quit = true,
                }
            }
        }

        terminal.draw(|frame| draw_ui(frame, &mut app))?;
    }

    input_shutdown.cancel();
    terminal.restore();
    if let Err(err) = app.controller.shutdown().await {
        warn!(error = %err, "feed shutdown failed");
    }
    info!("tui stopped");
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    let metrics = app.metrics();
    let feed = app.feed.borrow_and_update();
    draw_status_bar(
        frame,
        layout[0],
        &app.location,
        &feed,
        metrics.as_ref(),
        app.window.is_following(),
    );

    match app.current_tab {
        Tab::Records => {
            let selected = app
                .selected
                .and_then(|index| feed.records().get(index).map(|record| (index, record)));
            if app.detail_open && selected.is_some() {
                let split = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(layout[1]);
                draw_records(frame, split[0], &feed, &mut app.window, app.selected);
                draw_detail(frame, split[1], selected);
            } else {
                draw_records(frame, layout[1], &feed, &mut app.window, app.selected);
            }
        }
        Tab::Diagnostics => {
            draw_logs(frame, layout[1], &app.log_buffer);
        }
    }
    drop(feed);

    draw_tabs(frame, layout[2], app.current_tab);
    draw_footer(frame, layout[3], app);
}

fn draw_footer(frame: &mut ratatui::Frame, area: ratatui::layout::Rect, app: &AppState) {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let line1 = Line::from(vec![
        Span::styled("[Up/Down]", key_style),
        Span::raw(" Select  "),
        Span::styled("[PgUp/PgDn]", key_style),
        Span::raw(" Page  "),
        Span::styled("[g/G]", key_style),
        Span::raw(" Top/Bottom  "),
        Span::styled("[Enter]", key_style),
        Span::raw(" Detail  "),
        Span::styled("[Tab/1/2]", key_style),
        Span::raw(" Tabs"),
    ]);
    let line2 = Line::from(vec![
        Span::styled("[f]", key_style),
        Span::raw(" Follow  "),
        Span::styled("[r]", key_style),
        Span::raw(" Restart  "),
        Span::styled("[q]", key_style),
        Span::raw(" Quit  "),
        Span::raw(format!("Status: {}", app.status_message)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let text = Text::from(vec![line1, line2]);
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
