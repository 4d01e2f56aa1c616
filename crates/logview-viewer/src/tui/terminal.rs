/*
[INPUT]:  Crossterm stdout, terminal raw mode, viewer terminal options
[OUTPUT]: TerminalGuard managing alternate screen and mouse capture lifecycle
[POS]:    TUI terminal lifecycle guard
[UPDATE]: When changing terminal modes entered for the viewer
*/

use std::io;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use logview_viewer::ViewerConfig;

/// Terminal modes the viewer switches on for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct TerminalOptions {
    pub(super) mouse_capture: bool,
}

impl TerminalOptions {
    pub(super) fn from_config(config: &ViewerConfig) -> Self {
        Self {
            mouse_capture: config.mouse_capture,
        }
    }
}

pub(super) struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    options: TerminalOptions,
    restored: bool,
}

impl TerminalGuard {
    pub(super) fn new(options: TerminalOptions) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        if options.mouse_capture {
            stdout.execute(EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        debug!(mouse_capture = options.mouse_capture, "terminal ui entered");
        Ok(Self {
            terminal,
            options,
            restored: false,
        })
    }

    pub(super) fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Leave the alternate screen and undo every mode entered in `new`.
    pub(super) fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = self.terminal.show_cursor();
        let mut stdout = io::stdout();
        if self.options.mouse_capture {
            let _ = stdout.execute(DisableMouseCapture);
        }
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
