pub mod grid_view;
pub mod picker;
pub mod status_row;
pub mod tab_bar;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};

/// Main render function: tab bar, grid, status row, and any popup on top
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | grid | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // grid
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);
    grid_view::render_grid_view(frame, app, chunks[1]);

    if app.mode == Mode::Picker {
        picker::render_picker(frame, app, chunks[1]);
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_helpers::{TERM_H, TERM_W, app_with, render_to_string};

    #[test]
    fn test_full_screen_layout() {
        let mut app = app_with(&["Buy milk"]);
        let out = render_to_string(TERM_W, TERM_H, |frame, _| {
            render(frame, &mut app);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("Active (1)"));
        assert!(lines[2].starts_with("#"));
        assert!(lines[3].starts_with("1   Buy milk"));
        assert!(lines[TERM_H as usize - 1].ends_with("q quit"));
    }
}
