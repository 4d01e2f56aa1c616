/*
[INPUT]:  TUI app state and feed snapshots for UI components
[OUTPUT]: UI component render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding or removing panels
*/

mod detail;
mod layout;
mod logs;
mod records;

pub(in crate::tui) use detail::draw_detail;
pub(in crate::tui) use layout::{draw_status_bar, draw_tabs};
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use records::draw_records;
