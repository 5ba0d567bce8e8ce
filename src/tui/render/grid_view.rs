use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::grid::row_view::{Field, RowSlot};
use crate::tui::app::{App, Mode};
use crate::util::unicode::{
    byte_offset_to_display_col, display_col_to_byte_offset, display_width, fit_to_width,
};

const DATE_WIDTH: usize = 11;
const MIN_TITLE_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    RowNumber,
    Id,
    Title,
    Status,
    Category,
    Created,
    Finished,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::RowNumber => "#",
            Column::Id => "ID",
            Column::Title => "Title",
            Column::Status => "Status",
            Column::Category => "Category",
            Column::Created => "Created",
            Column::Finished => "Finished",
        }
    }

    fn field(self) -> Option<Field> {
        match self {
            Column::RowNumber => Some(Field::RowNumber),
            Column::Title => Some(Field::Title),
            Column::Status => Some(Field::Status),
            Column::Category => Some(Field::Category),
            _ => None,
        }
    }
}

fn widest(labels: &[String], header: &str) -> usize {
    labels
        .iter()
        .map(|l| display_width(l))
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
        + 1
}

/// Visible columns and their widths; the title takes what is left
fn layout_columns(app: &App, total: usize) -> Vec<(Column, usize)> {
    let rows = app.grid.rows();
    let columns = rows.columns;
    let mut cols = vec![(Column::RowNumber, rows.len().to_string().len().max(3) + 1)];
    if columns.show_ids {
        let id_width = app.grid.project().next_id.to_string().len().max(2) + 1;
        cols.push((Column::Id, id_width));
    }
    cols.push((Column::Title, 0));
    cols.push((Column::Status, widest(&rows.status_options, "Status")));
    if columns.show_categories {
        cols.push((Column::Category, widest(&rows.category_options, "Category")));
    }
    cols.push((Column::Created, DATE_WIDTH));
    if columns.show_finished {
        cols.push((Column::Finished, DATE_WIDTH));
    }
    let fixed: usize = cols.iter().map(|(_, w)| w).sum();
    let title = total.saturating_sub(fixed).max(MIN_TITLE_WIDTH);
    for col in cols.iter_mut() {
        if col.0 == Column::Title {
            col.1 = title;
        }
    }
    cols
}

fn cell_text(slot: &RowSlot, column: Column) -> String {
    match column {
        Column::RowNumber => slot.row_number.clone(),
        Column::Id => slot.task_id.to_string(),
        Column::Title => slot.title.clone(),
        Column::Status => slot.status.clone(),
        Column::Category => slot.category.clone(),
        Column::Created => slot.created.clone(),
        Column::Finished => slot.finished.clone(),
    }
}

/// Render the header row and the rows of the displayed view
pub fn render_grid_view(frame: &mut Frame, app: &mut App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let bg = app.theme.background;
    let columns = layout_columns(app, area.width as usize);

    let header: Vec<Span> = columns
        .iter()
        .map(|(col, width)| {
            Span::styled(
                fit_to_width(col.label(), *width),
                Style::default()
                    .fg(app.theme.header)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let mut lines = vec![Line::from(header)];

    let body_height = area.height as usize - 1;
    app.ensure_visible(body_height);

    if app.grid.rows().is_empty() {
        let label = app.grid.showing().label().to_lowercase();
        lines.push(Line::from(Span::styled(
            format!(" No {} tasks. Press a to add one.", label),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    let focus = app.grid.focus();
    let mut cursor_pos = None;
    let slots = app.grid.rows().slots();
    for (i, slot) in slots.iter().enumerate().skip(app.scroll_offset).take(body_height) {
        let row = i + 1;
        let focused_row = focus.is_some_and(|f| f.row == row);
        let row_bg = if focused_row { app.theme.selection_bg } else { bg };
        let mut x = area.x as usize;
        let mut spans = Vec::with_capacity(columns.len());
        for (col, width) in &columns {
            let focused_cell = focused_row && focus.map(|f| f.field) == col.field();
            let mut style = Style::default().bg(row_bg).fg(match col {
                Column::RowNumber | Column::Id | Column::Created | Column::Finished => {
                    app.theme.dim
                }
                Column::Status => {
                    app.theme
                        .status_color(&app.grid.project().statuses, &slot.status)
                }
                Column::Category => app.theme.cyan,
                Column::Title => {
                    if focused_row {
                        app.theme.text_bright
                    } else {
                        app.theme.text
                    }
                }
            });
            if focused_cell {
                style = style.add_modifier(Modifier::BOLD);
            }

            let text = match (app.mode, col) {
                (Mode::Edit, Column::Title) if focused_row => {
                    let (shown, caret_col) =
                        scrolled_edit_text(&app.edit_buffer, app.edit_cursor, *width);
                    cursor_pos = Some((x + caret_col, i - app.scroll_offset + 1));
                    style = style.fg(app.theme.text_bright).add_modifier(Modifier::UNDERLINED);
                    shown
                }
                (Mode::RowNumber, Column::RowNumber) if focused_row => {
                    let caret_col = byte_offset_to_display_col(&slot.row_number, app.edit_cursor);
                    let caret_col = caret_col.min(width.saturating_sub(1));
                    cursor_pos = Some((x + caret_col, i - app.scroll_offset + 1));
                    style = style.fg(app.theme.highlight);
                    slot.row_number.clone()
                }
                _ => cell_text(slot, *col),
            };
            spans.push(Span::styled(fit_to_width(&text, *width), style));
            x += width;
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);

    if let Some((x, y)) = cursor_pos {
        let x = (x as u16).min(area.right().saturating_sub(1));
        frame.set_cursor_position((x, area.y + y as u16));
    }
}

/// The part of an edit buffer that fits in `width` cells with the caret
/// visible, and the caret's column within it.
fn scrolled_edit_text(buffer: &str, caret: usize, width: usize) -> (String, usize) {
    let caret_col = byte_offset_to_display_col(buffer, caret);
    // Last cell is kept free for the caret at end of text
    let usable = width.saturating_sub(1);
    if caret_col <= usable {
        return (buffer.to_string(), caret_col);
    }
    let start = display_col_to_byte_offset(buffer, caret_col - usable);
    let shown = &buffer[start..];
    (shown.to_string(), caret_col - byte_offset_to_display_col(buffer, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::View;
    use crate::tui::render::test_helpers::{TERM_W, app_with, render_to_string};

    #[test]
    fn test_header_and_rows() {
        let mut app = app_with(&["Buy milk", "Call plumber"]);
        let out = render_to_string(TERM_W, 6, |frame, area| {
            render_grid_view(frame, &mut app, area);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("#   Title"));
        assert!(lines[0].contains("Status"));
        assert!(lines[0].contains("Created"));
        assert!(!lines[0].contains("Finished"));
        assert!(!lines[0].contains("Category"));
        assert!(lines[1].starts_with("1   Buy milk"));
        assert!(lines[1].contains("Todo"));
        assert!(lines[2].starts_with("2   Call plumber"));
    }

    #[test]
    fn test_inactive_view_shows_finished() {
        let mut app = app_with(&["Buy milk"]);
        app.grid.change_status(1, "Done");
        app.show_view(View::Inactive);
        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_grid_view(frame, &mut app, area);
        });
        assert!(out.lines().next().unwrap().contains("Finished"));
        assert!(out.contains("Done"));
    }

    #[test]
    fn test_empty_view_hint() {
        let mut app = app_with(&[]);
        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_grid_view(frame, &mut app, area);
        });
        assert!(out.contains("No active tasks"));
    }

    #[test]
    fn test_id_and_category_columns() {
        let mut app = app_with(&["Buy milk"]);
        app.grid.toggle_task_ids();
        app.open_prompt(crate::tui::app::PromptKind::Categories);
        app.edit_buffer = ", Errands".into();
        app.commit_prompt();
        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_grid_view(frame, &mut app, area);
        });
        let header = out.lines().next().unwrap();
        assert!(header.starts_with("#   ID Title"));
        assert!(header.contains("Category"));
    }

    #[test]
    fn test_scrolls_to_focus() {
        let titles: Vec<String> = (1..=10).map(|i| format!("Task {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let mut app = app_with(&refs);
        app.grid.focus_title(9, 0, 0);
        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_grid_view(frame, &mut app, area);
        });
        assert!(out.contains("Task 9"));
        assert!(!out.contains("Task 1 "));
        assert_eq!(app.scroll_offset, 6);
    }

    #[test]
    fn test_scrolled_edit_text_keeps_caret_visible() {
        assert_eq!(scrolled_edit_text("abc", 3, 10), ("abc".to_string(), 3));
        let (shown, col) = scrolled_edit_text("abcdefghij", 10, 5);
        assert_eq!(shown, "ghij");
        assert_eq!(col, 4);
    }
}
