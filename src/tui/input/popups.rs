use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_picker(app: &mut App, key: KeyEvent) {
    let Some(picker) = app.picker.as_mut() else {
        app.close_picker();
        return;
    };
    let last = picker.options.len().saturating_sub(1);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => picker.cursor = picker.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => picker.cursor = (picker.cursor + 1).min(last),
        KeyCode::Home | KeyCode::Char('g') => picker.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => picker.cursor = last,
        KeyCode::Enter => app.choose_picked(),
        KeyCode::Esc => app.close_picker(),
        _ => {}
    }
}

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_reload(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_reload(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use crate::tui::app::Mode;
    use crate::tui::input::press;
    use crate::tui::render::test_helpers::app_with;

    #[test]
    fn test_picker_keys() {
        let mut app = app_with(&["A"]);
        app.grid.focus_title(1, 0, 0);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.picker.as_ref().unwrap().cursor, 2);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.grid.rows().slot(1).unwrap().status, "Doing");
    }

    #[test]
    fn test_picker_escape_changes_nothing() {
        let mut app = app_with(&["A"]);
        app.grid.focus_title(1, 0, 0);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('G'));
        press(&mut app, KeyCode::Esc);
        assert!(app.picker.is_none());
        assert_eq!(app.grid.rows().slot(1).unwrap().status, "Todo");
    }

    #[test]
    fn test_confirm_decline_keeps_state() {
        let mut app = app_with(&["A"]);
        app.confirm_text = Some("reload?".into());
        app.mode = Mode::Confirm;
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode, Mode::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.confirm_text.is_none());
        assert_eq!(app.grid.rows().len(), 1);
    }
}
