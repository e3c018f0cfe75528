//! Event polling and key handling.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::app::{App, View};

/// Poll for a terminal event with a timeout.
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Any key closes the help overlay.
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // View switching
        KeyCode::Tab | KeyCode::BackTab => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Chart),
        KeyCode::Char('2') => app.set_view(View::Console),
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
            app.next_view()
        }

        // Freeze/resume the display
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_pause(),

        // Chart controls
        KeyCode::Char('m') => app.toggle_series(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.grow_window(),
        KeyCode::Char('-') => app.shrink_window(),

        // Console controls
        KeyCode::Char('c') => {
            if app.view == View::Console {
                app.clear_console();
            }
        }

        // Export current window
        KeyCode::Char('e') => {
            let path = std::path::PathBuf::from("padwatch_capture.json");
            match app.export_capture(&path) {
                Ok(()) => app.set_status_message(format!("Exported to {}", path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {e}")),
            }
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}
