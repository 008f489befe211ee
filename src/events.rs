use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};

use crate::app_state::App;

/// Returns `Ok(true)` when the app should exit.
pub async fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<bool> {
    // The picker prompt captures input while it is open.
    if app.input.picker().is_open() {
        match key.code {
            KeyCode::Esc => app.input.picker_mut().close(),
            KeyCode::Enter => app.confirm_picker().await,
            _ => app.input.picker_mut().input_key(key),
        }
        return Ok(false);
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => Ok(true),

        (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
            app.input.open_picker();
            Ok(false)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('x')) => {
            app.remove_image();
            Ok(false)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
            app.clear_chat();
            Ok(false)
        }

        // Scrolling
        (KeyModifiers::NONE, KeyCode::PageUp) => {
            app.transcript.scroll_up(5);
            Ok(false)
        }
        (KeyModifiers::NONE, KeyCode::PageDown) => {
            app.transcript.scroll_down(5);
            Ok(false)
        }
        (KeyModifiers::CONTROL, KeyCode::Home) => {
            app.transcript.scroll_to_top();
            Ok(false)
        }
        (KeyModifiers::CONTROL, KeyCode::End) => {
            app.transcript.scroll_to_bottom();
            Ok(false)
        }

        // Enter without a modifier sends; Shift/Alt+Enter adds a line.
        (KeyModifiers::NONE, KeyCode::Enter) => {
            app.submit();
            Ok(false)
        }
        (m, KeyCode::Enter) if m.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            app.input.insert_newline();
            Ok(false)
        }

        _ => {
            app.input.input_key(key);
            Ok(false)
        }
    }
}

pub fn handle_mouse_event(app: &mut App, kind: MouseEventKind) -> Result<bool> {
    match kind {
        MouseEventKind::ScrollUp => app.transcript.scroll_up(3),
        MouseEventKind::ScrollDown => app.transcript.scroll_down(3),
        _ => {}
    }
    Ok(false)
}
