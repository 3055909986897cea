use crate::model::TodoFilter;
use crate::ui::app::{App, PopupKind};
use crate::ui::editor::EditorIntent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key bindings shown in the shortcuts popup, in display order.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("n / Ctrl+N", "New todo"),
    ("Space", "Toggle completed"),
    ("Enter", "Edit title"),
    ("d / Delete", "Delete todo"),
    ("Tab / f", "Next filter"),
    ("1 2 3", "All / Active / Completed"),
    ("v", "List / grid view"),
    ("C", "Clear completed"),
    ("r", "Refresh"),
    ("x", "Dismiss error"),
    ("↑↓ / j k", "Move selection"),
    ("? / Ctrl+/", "Shortcuts"),
    ("q / Ctrl+C", "Quit"),
];

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if is_ctrl_char(key, 'c') {
        app.request_quit();
        return;
    }

    match app.popup_kind() {
        Some(PopupKind::Editor) => handle_editor_key(app, key),
        Some(PopupKind::Shortcuts) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?' | 'q'))
                || is_ctrl_char(key, '/')
            {
                app.close_popup();
            }
        }
        None => handle_list_key(app, key),
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    let intent = match key.code {
        KeyCode::Esc => {
            app.close_popup();
            return;
        }
        KeyCode::Enter => {
            app.submit_editor();
            return;
        }
        KeyCode::Backspace => EditorIntent::Backspace,
        KeyCode::Delete => EditorIntent::Delete,
        KeyCode::Left => EditorIntent::CursorLeft,
        KeyCode::Right => EditorIntent::CursorRight,
        KeyCode::Home => EditorIntent::CursorHome,
        KeyCode::End => EditorIntent::CursorEnd,
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            EditorIntent::CursorHome
        }
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            EditorIntent::CursorEnd
        }
        KeyCode::Char(ch) if is_plain(key) => EditorIntent::Insert(ch),
        _ => return,
    };
    app.dispatch_editor(intent);
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    if is_ctrl_char(key, 'n') {
        app.open_composer();
        return;
    }
    if is_ctrl_char(key, '/') {
        app.toggle_shortcuts();
        return;
    }

    match key.code {
        KeyCode::Up => app.move_rows(-1),
        KeyCode::Down => app.move_rows(1),
        KeyCode::Left => app.move_selection(-1),
        KeyCode::Right => app.move_selection(1),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Enter => app.open_editor_for_selected(),
        KeyCode::Delete => app.remove_selected(),
        KeyCode::Tab => app.cycle_filter(),
        KeyCode::Esc => app.dismiss_error(),
        KeyCode::Char(ch) if is_plain(key) => match ch {
            'q' => app.request_quit(),
            'n' => app.open_composer(),
            ' ' => app.toggle_selected(),
            'd' => app.remove_selected(),
            'f' => app.cycle_filter(),
            '1' => app.set_filter(TodoFilter::All),
            '2' => app.set_filter(TodoFilter::Active),
            '3' => app.set_filter(TodoFilter::Completed),
            'v' => app.toggle_view(),
            'C' => app.clear_completed(),
            'r' => app.refresh(),
            'x' => app.dismiss_error(),
            'j' => app.move_rows(1),
            'k' => app.move_rows(-1),
            'h' => app.move_selection(-1),
            'l' => app.move_selection(1),
            'g' => app.select_first(),
            'G' => app.select_last(),
            '?' => app.toggle_shortcuts(),
            _ => {}
        },
        _ => {}
    }
}

/// A character typed without Ctrl or Alt. Shift is fine.
fn is_plain(key: KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn is_ctrl_char(key: KeyEvent, needle: char) -> bool {
    matches!(key.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&needle))
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::SHIFT)
}
