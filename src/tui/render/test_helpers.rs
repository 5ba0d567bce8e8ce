use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::grid::controller::GridController;
use crate::model::Project;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// An App on an unsaved project whose active view holds `titles` in
/// order, with focus on the first row.
pub fn app_with(titles: &[&str]) -> App {
    let project = Project::new("Test", PathBuf::from("/nonexistent/tasks.toml"));
    let mut grid = GridController::new(project);
    grid.set_clock(fixed_now);
    for (i, title) in titles.iter().enumerate() {
        grid.add_task_below(i);
        grid.edit_title(i + 1, title, title.len());
    }
    let mut app = App::new(grid);
    app.grid.take_notice();
    if !titles.is_empty() {
        app.grid.focus_title(1, 0, 0);
    }
    app
}
