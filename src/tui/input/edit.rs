use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::unicode::{
    next_grapheme_boundary, prev_grapheme_boundary, word_boundary_left, word_boundary_right,
};

// ---------------------------------------------------------------------------
// Shared single-line editing
// ---------------------------------------------------------------------------

/// Apply a caret or text key to the edit buffer. Returns false when the key
/// is not an editing key.
fn edit_buffer_key(app: &mut App, key: KeyEvent) -> bool {
    let buf = &mut app.edit_buffer;
    let cursor = &mut app.edit_cursor;
    let word =
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.modifiers, key.code) {
        (_, KeyCode::Left) if word => *cursor = word_boundary_left(buf, *cursor),
        (_, KeyCode::Right) if word => *cursor = word_boundary_right(buf, *cursor),
        (_, KeyCode::Left) => *cursor = prev_grapheme_boundary(buf, *cursor).unwrap_or(0),
        (_, KeyCode::Right) => *cursor = next_grapheme_boundary(buf, *cursor).unwrap_or(buf.len()),
        (_, KeyCode::Home) => *cursor = 0,
        (_, KeyCode::End) => *cursor = buf.len(),
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => *cursor = 0,
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => *cursor = buf.len(),
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            buf.replace_range(..*cursor, "");
            *cursor = 0;
        }
        (m, KeyCode::Backspace) if m.contains(KeyModifiers::ALT) => {
            let start = word_boundary_left(buf, *cursor);
            buf.replace_range(start..*cursor, "");
            *cursor = start;
        }
        (_, KeyCode::Backspace) => {
            if let Some(prev) = prev_grapheme_boundary(buf, *cursor) {
                buf.replace_range(prev..*cursor, "");
                *cursor = prev;
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(next) = next_grapheme_boundary(buf, *cursor) {
                buf.replace_range(*cursor..next, "");
            }
        }
        (m, KeyCode::Char(c))
            if !m.contains(KeyModifiers::CONTROL) && !m.contains(KeyModifiers::ALT) =>
        {
            buf.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        _ => return false,
    }
    true
}

// ---------------------------------------------------------------------------
// Title editing
// ---------------------------------------------------------------------------

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Up => app.commit_edit_and_move(-1),
        KeyCode::Down | KeyCode::Tab => app.commit_edit_and_move(1),
        _ => {
            edit_buffer_key(app, key);
        }
    }
}

// ---------------------------------------------------------------------------
// Row number
// ---------------------------------------------------------------------------

pub(super) fn handle_row_number(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_row_number(),
        KeyCode::Esc => app.cancel_row_number(),
        _ => {
            if edit_buffer_key(app, key) {
                let row = app.cursor_row();
                app.grid.type_row_number(row, &app.edit_buffer);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Vocabulary prompt
// ---------------------------------------------------------------------------

pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_prompt(),
        KeyCode::Esc => app.cancel_prompt(),
        _ => {
            edit_buffer_key(app, key);
        }
    }
}
