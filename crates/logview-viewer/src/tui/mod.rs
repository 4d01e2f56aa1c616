/*
[INPUT]:  Feed transport and location, viewer config, diagnostics log buffer
[OUTPUT]: Ratatui-based TUI for browsing a streaming NDJSON feed
[POS]:    TUI module for logview-viewer binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::run_tui;
