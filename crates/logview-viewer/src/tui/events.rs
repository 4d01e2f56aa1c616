/*
[INPUT]:  Crossterm key and mouse events
[OUTPUT]: AppState navigation, tab, follow, detail, and restart actions
[POS]:    TUI event routing
[UPDATE]: When adding or rebinding hotkeys
*/

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use super::app::{AppState, Tab};

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('1') => app.set_tab(Tab::Records),
        KeyCode::Char('2') => app.set_tab(Tab::Diagnostics),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }

    if app.current_tab != Tab::Records {
        return false;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home | KeyCode::Char('g') => app.jump_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.jump_to_bottom(),
        KeyCode::Enter => app.toggle_detail(),
        KeyCode::Esc => app.detail_open = false,
        KeyCode::Char('f') => app.toggle_follow(),
        _ => {}
    }
    false
}

pub(super) fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) {
    if app.current_tab != Tab::Records {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_wheel(true),
        MouseEventKind::ScrollUp => app.scroll_wheel(false),
        _ => {}
    }
}
