use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::View;
use crate::tui::app::{App, PickerKind, PromptKind};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Focus
        (m, KeyCode::Up) if m.contains(KeyModifiers::CONTROL) => app.move_focus(-1, true),
        (m, KeyCode::Down) if m.contains(KeyModifiers::CONTROL) => app.move_focus(1, true),
        (_, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => app.move_focus(-1, false),
        (_, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => app.move_focus(1, false),
        (_, KeyCode::Tab) => app.grid.focus_next_tab_stop(),

        // Undo / redo
        (m, KeyCode::Char('z')) if m.contains(KeyModifiers::CONTROL) => {
            app.grid.undo();
        }
        (m, KeyCode::Char('r') | KeyCode::Char('y')) if m.contains(KeyModifiers::CONTROL) => {
            app.grid.redo();
        }
        (KeyModifiers::NONE, KeyCode::Char('u')) => {
            app.grid.undo();
        }

        // Rows
        (m, KeyCode::Char('n')) if m.contains(KeyModifiers::CONTROL) => {
            app.add_and_edit(app.cursor_row());
        }
        (KeyModifiers::NONE, KeyCode::Char('a')) => app.add_and_edit(app.cursor_row()),
        (_, KeyCode::Char('A')) => app.add_and_edit(0),
        (KeyModifiers::NONE, KeyCode::Char('x')) => {
            let row = app.cursor_row();
            if row > 0 {
                app.grid.delete_task(row);
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('e')) => app.begin_edit(),
        (_, KeyCode::Enter) => app.activate_focus(),
        (_, KeyCode::Char('#')) => app.begin_row_number(),
        (KeyModifiers::NONE, KeyCode::Char('s')) => app.open_picker(PickerKind::Status),
        (KeyModifiers::NONE, KeyCode::Char('c')) => app.open_picker(PickerKind::Category),

        // Toolbar
        (_, KeyCode::Char('1')) => app.show_view(View::Active),
        (_, KeyCode::Char('2')) => app.show_view(View::Inactive),
        (_, KeyCode::Char('S')) => app.open_prompt(PromptKind::Statuses),
        (_, KeyCode::Char('C')) => app.open_prompt(PromptKind::Categories),
        (_, KeyCode::Char('X')) => app.grid.clear_all_inactive(),
        (KeyModifiers::NONE, KeyCode::Char('i')) => app.grid.toggle_task_ids(),
        (KeyModifiers::NONE, KeyCode::Char('q')) => app.should_quit = true,
        _ => {}
    }
}
