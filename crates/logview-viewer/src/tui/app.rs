/*
[INPUT]:  FeedController, frame queue, window state, log buffer, user navigation
[OUTPUT]: AppState with selection, scroll, detail, tab, and restart helpers
[POS]:    TUI app state
[UPDATE]: When adding navigation actions or per-view state
*/

use tokio::sync::watch;
use tracing::info;

use logview_adapter::FeedLocation;
use logview_viewer::{
    FeedController, FeedMetricsSnapshot, FeedState, FrameQueue, LogBufferHandle, ViewerConfig,
    WindowState,
};

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Records,
    Diagnostics,
}

pub(super) struct AppState {
    pub(super) controller: FeedController,
    pub(super) feed: watch::Receiver<FeedState>,
    pub(super) frames: FrameQueue,
    pub(super) window: WindowState,
    pub(super) selected: Option<usize>,
    pub(super) detail_open: bool,
    pub(super) current_tab: Tab,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) location: FeedLocation,
    pub(super) status_message: String,
    follow_on_start: bool,
}

impl AppState {
    pub(super) fn new(
        mut controller: FeedController,
        frames: FrameQueue,
        location: FeedLocation,
        config: &ViewerConfig,
        log_buffer: LogBufferHandle,
    ) -> Self {
        let feed = controller.subscribe(location.clone());
        Self {
            controller,
            feed,
            frames,
            window: WindowState::new(config.row_extent, config.overscan, config.follow),
            selected: None,
            detail_open: false,
            current_tab: Tab::Records,
            log_buffer,
            location,
            status_message: "Ready".to_string(),
            follow_on_start: config.follow,
        }
    }

    pub(super) fn record_count(&self) -> usize {
        self.feed.borrow().len()
    }

    pub(super) fn metrics(&self) -> Option<FeedMetricsSnapshot> {
        self.controller.metrics()
    }

    /// Drop the current feed state and stream the same location again.
    pub(super) fn restart(&mut self) {
        if let Some(feed) = self.controller.restart() {
            self.feed = feed;
        } else {
            self.feed = self.controller.subscribe(self.location.clone());
        }
        self.selected = None;
        self.detail_open = false;
        self.window.reset();
        self.window.set_follow(self.follow_on_start);
        self.status_message = format!("restarted {}", self.location);
        info!(location = %self.location, "feed restarted by user");
    }

    pub(super) fn move_selection(&mut self, delta: i64) {
        let count = self.record_count();
        if count == 0 {
            self.selected = None;
            return;
        }

        let next = match self.selected {
            Some(current) => {
                let target = current as i64 + delta;
                target.clamp(0, count as i64 - 1) as usize
            }
            None => {
                let visible = self.window.visible_rows(count);
                if delta < 0 {
                    visible.end.saturating_sub(1)
                } else {
                    visible.start
                }
            }
        };
        self.selected = Some(next);
        self.window.select_row(next, count);
    }

    pub(super) fn page_down(&mut self) {
        let count = self.record_count();
        self.window.page_down(count);
        self.clamp_selection_to_view(count);
    }

    pub(super) fn page_up(&mut self) {
        let count = self.record_count();
        self.window.page_up(count);
        self.clamp_selection_to_view(count);
    }

    pub(super) fn scroll_wheel(&mut self, down: bool) {
        let count = self.record_count();
        let delta = if down { WHEEL_STEP } else { -WHEEL_STEP };
        self.window
            .scroll_by(delta * self.window.row_extent() as i64, count);
    }

    pub(super) fn jump_to_top(&mut self) {
        self.window.scroll_to_top();
        if self.record_count() > 0 {
            self.selected = Some(0);
        }
    }

    pub(super) fn jump_to_bottom(&mut self) {
        let count = self.record_count();
        self.window.scroll_to_bottom(count);
        self.selected = count.checked_sub(1);
    }

    pub(super) fn toggle_follow(&mut self) {
        let count = self.record_count();
        if self.window.toggle_follow() {
            self.window.scroll_to_bottom(count);
            self.status_message = "follow on".to_string();
        } else {
            self.status_message = "follow off".to_string();
        }
    }

    pub(super) fn toggle_detail(&mut self) {
        if self.selected.is_none() {
            self.move_selection(0);
        }
        self.detail_open = self.selected.is_some() && !self.detail_open;
    }

    pub(super) fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub(super) fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Records => Tab::Diagnostics,
            Tab::Diagnostics => Tab::Records,
        };
    }

    fn clamp_selection_to_view(&mut self, count: usize) {
        let Some(selected) = self.selected else {
            return;
        };
        let visible = self.window.visible_rows(count);
        if visible.is_empty() {
            return;
        }
        if !visible.contains(selected) {
            self.selected = Some(selected.clamp(visible.start, visible.end - 1));
        }
    }
}
