/*
[INPUT]:  Record count, viewport scroll offset/extent, fixed row extent, overscan
[OUTPUT]: Visible index range plus layout geometry; stateful scroll/follow tracking
[POS]:    Rendering pipeline - windowed list math (pure, presentation-agnostic)
[UPDATE]: When changing overscan policy, scroll clamping, or follow mode
*/

use std::ops::Range;

pub const DEFAULT_OVERSCAN: u64 = 8;

/// Visible region of the scroll container, in row-extent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub scroll_offset: u64,
    pub extent: u64,
}

impl Viewport {
    pub fn new(scroll_offset: u64, extent: u64) -> Self {
        Self {
            scroll_offset,
            extent,
        }
    }
}

/// Half-open `[start, end)` slice of the record list to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
}

impl WindowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Compute the rows to materialize for the given viewport.
///
/// `start = max(0, floor(offset / row) - overscan)` and
/// `end = min(count, ceil((offset + extent) / row) + overscan)`. A zero row
/// extent or a start past the end of the list yields an empty slice.
pub fn compute_window(
    record_count: usize,
    viewport: Viewport,
    row_extent: u64,
    overscan: u64,
) -> WindowRange {
    if row_extent == 0 {
        return WindowRange::default();
    }

    let first_visible = viewport.scroll_offset / row_extent;
    let start = first_visible.saturating_sub(overscan);
    let end = viewport
        .scroll_offset
        .saturating_add(viewport.extent)
        .div_ceil(row_extent)
        .saturating_add(overscan)
        .min(record_count as u64);

    WindowRange {
        start: start.min(end) as usize,
        end: end as usize,
    }
}

/// Window slice plus the geometry a renderer needs to place it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowLayout {
    pub range: WindowRange,
    /// Full scrollable extent, `record_count * row_extent`
    pub total_extent: u64,
    /// Position of the first materialized row, `start * row_extent`
    pub offset: u64,
}

pub fn layout_window(
    record_count: usize,
    viewport: Viewport,
    row_extent: u64,
    overscan: u64,
) -> WindowLayout {
    let range = compute_window(record_count, viewport, row_extent, overscan);
    WindowLayout {
        range,
        total_extent: (record_count as u64).saturating_mul(row_extent),
        offset: (range.start as u64).saturating_mul(row_extent),
    }
}

/// Scroll position of one list view, with tail-follow.
///
/// While following, the view sticks to the end of the list as records are
/// appended. Scrolling up leaves follow mode; reaching the bottom re-enters it.
#[derive(Debug, Clone)]
pub struct WindowState {
    row_extent: u64,
    overscan: u64,
    scroll_offset: u64,
    viewport_extent: u64,
    follow: bool,
}

impl WindowState {
    pub fn new(row_extent: u64, overscan: u64, follow: bool) -> Self {
        Self {
            row_extent,
            overscan,
            scroll_offset: 0,
            viewport_extent: row_extent,
            follow,
        }
    }

    pub fn row_extent(&self) -> u64 {
        self.row_extent
    }

    pub fn overscan(&self) -> u64 {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport_extent(&self) -> u64 {
        self.viewport_extent
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.scroll_offset, self.viewport_extent)
    }

    /// Update the measured viewport. Returns true when it changed.
    pub fn set_viewport_extent(&mut self, extent: u64) -> bool {
        let extent = extent.max(1);
        if extent == self.viewport_extent {
            return false;
        }
        self.viewport_extent = extent;
        true
    }

    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
    }

    pub fn toggle_follow(&mut self) -> bool {
        self.follow = !self.follow;
        self.follow
    }

    pub fn max_scroll(&self, record_count: usize) -> u64 {
        (record_count as u64)
            .saturating_mul(self.row_extent)
            .saturating_sub(self.viewport_extent)
    }

    pub fn scroll_to(&mut self, offset: u64, record_count: usize) {
        let max = self.max_scroll(record_count);
        self.scroll_offset = offset.min(max);
        self.follow = self.scroll_offset == max && record_count > 0;
    }

    pub fn scroll_by(&mut self, delta: i64, record_count: usize) {
        let target = if delta.is_negative() {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as u64)
        };
        self.scroll_to(target, record_count);
    }

    pub fn page_down(&mut self, record_count: usize) {
        self.scroll_by(self.page_step(), record_count);
    }

    pub fn page_up(&mut self, record_count: usize) {
        self.scroll_by(-self.page_step(), record_count);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self, record_count: usize) {
        self.scroll_offset = self.max_scroll(record_count);
        self.follow = true;
    }

    /// Adjust the scroll offset so `index` lies inside the visible band.
    pub fn ensure_visible(&mut self, index: usize, record_count: usize) {
        if self.row_extent == 0 {
            return;
        }
        let top = index as u64 * self.row_extent;
        let bottom = top + self.row_extent;
        if top < self.scroll_offset {
            self.scroll_to(top, record_count);
        } else if bottom > self.scroll_offset + self.viewport_extent {
            self.scroll_to(bottom.saturating_sub(self.viewport_extent), record_count);
        }
    }

    /// Bring a user-selected row into view. Picking any row above the last one
    /// leaves follow mode so the selection stays put as records arrive.
    pub fn select_row(&mut self, index: usize, record_count: usize) {
        self.ensure_visible(index, record_count);
        if index + 1 < record_count {
            self.follow = false;
        }
    }

    /// Rows actually on screen, without overscan.
    pub fn visible_rows(&self, record_count: usize) -> WindowRange {
        compute_window(record_count, self.viewport(), self.row_extent, 0)
    }

    /// Apply follow and clamping for the current record count, then lay out.
    pub fn layout(&mut self, record_count: usize) -> WindowLayout {
        let max = self.max_scroll(record_count);
        if self.follow || self.scroll_offset > max {
            self.scroll_offset = max;
        }
        layout_window(record_count, self.viewport(), self.row_extent, self.overscan)
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }

    fn page_step(&self) -> i64 {
        let rows = (self.viewport_extent / self.row_extent.max(1)).max(1);
        (rows.saturating_sub(1).max(1) * self.row_extent) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_around_offset_includes_overscan() {
        let range = compute_window(1000, Viewport::new(9600, 800), 48, 8);
        assert_eq!(range, WindowRange { start: 192, end: 225 });
        assert!(range.contains(200));
    }

    #[test]
    fn window_at_top_starts_at_zero() {
        let range = compute_window(1000, Viewport::new(0, 800), 48, 8);
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 17 + 8);
    }

    #[test]
    fn window_clamps_to_record_count() {
        let range = compute_window(10, Viewport::new(0, 800), 48, 8);
        assert_eq!(range, WindowRange { start: 0, end: 10 });
    }

    #[test]
    fn empty_list_produces_empty_window() {
        assert!(compute_window(0, Viewport::new(0, 800), 48, 8).is_empty());
    }

    #[test]
    fn offset_past_end_clamps_to_empty_slice() {
        let range = compute_window(10, Viewport::new(48 * 100, 800), 48, 8);
        assert!(range.is_empty());
        assert_eq!(range.start, 10);
    }

    #[test]
    fn zero_row_extent_renders_nothing() {
        assert!(compute_window(100, Viewport::new(0, 800), 0, 8).is_empty());
    }

    #[test]
    fn layout_reports_total_extent_and_offset() {
        let layout = layout_window(1000, Viewport::new(9600, 800), 48, 8);
        assert_eq!(layout.total_extent, 48_000);
        assert_eq!(layout.offset, 192 * 48);
    }

    #[test]
    fn follow_mode_tracks_the_tail() {
        let mut state = WindowState::new(1, 2, true);
        state.set_viewport_extent(10);

        let layout = state.layout(5);
        assert_eq!(state.scroll_offset(), 0);
        assert_eq!(layout.range.as_range(), 0..5);

        let layout = state.layout(100);
        assert_eq!(state.scroll_offset(), 90);
        assert_eq!(layout.range.as_range(), 88..100);
    }

    #[test]
    fn selecting_above_the_tail_leaves_follow() {
        let mut state = WindowState::new(1, 0, true);
        state.set_viewport_extent(10);
        state.layout(100);

        state.select_row(99, 100);
        assert!(state.is_following());

        state.select_row(97, 100);
        assert!(!state.is_following());
        let before = state.layout(100).range;
        assert_eq!(state.layout(150).range, before);
        assert!(state.visible_rows(150).contains(97));
    }

    #[test]
    fn scrolling_up_leaves_follow_and_bottom_reenters_it() {
        let mut state = WindowState::new(1, 0, true);
        state.set_viewport_extent(10);
        state.layout(50);

        state.scroll_by(-3, 50);
        assert!(!state.is_following());
        assert_eq!(state.scroll_offset(), 37);

        state.layout(80);
        assert_eq!(state.scroll_offset(), 37);

        state.scroll_to_bottom(80);
        assert!(state.is_following());
        assert_eq!(state.scroll_offset(), 70);
    }

    #[test]
    fn paging_moves_by_viewport_minus_one_row() {
        let mut state = WindowState::new(1, 0, false);
        state.set_viewport_extent(10);
        state.page_down(100);
        assert_eq!(state.scroll_offset(), 9);
        state.page_up(100);
        assert_eq!(state.scroll_offset(), 0);
    }

    #[test]
    fn ensure_visible_scrolls_minimally() {
        let mut state = WindowState::new(1, 0, false);
        state.set_viewport_extent(10);

        state.ensure_visible(15, 100);
        assert_eq!(state.scroll_offset(), 6);
        assert_eq!(state.visible_rows(100).as_range(), 6..16);

        state.ensure_visible(3, 100);
        assert_eq!(state.scroll_offset(), 3);
    }

    #[test]
    fn shrinking_list_clamps_offset() {
        let mut state = WindowState::new(1, 0, false);
        state.set_viewport_extent(10);
        state.scroll_to(40, 100);
        state.layout(20);
        assert_eq!(state.scroll_offset(), 10);
    }
}
