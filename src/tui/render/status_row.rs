use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::grid::controller::NoticeLevel;
use crate::tui::app::{App, Mode, PromptKind};
use crate::util::unicode::{byte_offset_to_display_col, display_width};

const NAVIGATE_HINT: &str = "a add  x del  # move  s status  u undo  ^r redo  q quit";
const EDIT_HINT: &str = "Enter save  Esc cancel";
const ROW_NUMBER_HINT: &str = "Enter move  Esc cancel";
const PICKER_HINT: &str = "j/k choose  Enter set  Esc cancel";
const CONFIRM_HINT: &str = "(y/n)";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    // Notices win over hints in every mode but the text-entry ones
    if !matches!(app.mode, Mode::Prompt | Mode::Confirm)
        && let Some(notice) = app.visible_notice()
    {
        let fg = match notice.level {
            NoticeLevel::Error => app.theme.red,
            NoticeLevel::Info => app.theme.dim,
        };
        let line = Line::from(Span::styled(
            format!(" {}", notice.message),
            Style::default().fg(fg).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    let mut spans: Vec<Span> = Vec::new();
    let hint = match app.mode {
        Mode::Navigate => NAVIGATE_HINT,
        Mode::Edit => EDIT_HINT,
        Mode::RowNumber => {
            spans.push(Span::styled(
                format!(" move to row {}", app.edit_buffer),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ));
            ROW_NUMBER_HINT
        }
        Mode::Picker => PICKER_HINT,
        Mode::Prompt => {
            let label = match app.prompt {
                Some(PromptKind::Categories) => "categories",
                _ => "statuses",
            };
            let prefix = format!("{}: ", label);
            spans.push(Span::styled(
                prefix.clone(),
                Style::default().fg(app.theme.highlight).bg(bg),
            ));
            spans.push(Span::styled(
                app.edit_buffer.clone(),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ));
            let caret = display_width(&prefix)
                + byte_offset_to_display_col(&app.edit_buffer, app.edit_cursor);
            if caret < width {
                frame.set_cursor_position((area.x + caret as u16, area.y));
            }
            "Enter apply  Esc cancel"
        }
        Mode::Confirm => {
            if let Some(question) = &app.confirm_text {
                spans.push(Span::styled(
                    format!(" {} ", question),
                    Style::default().fg(app.theme.yellow).bg(bg),
                ));
            }
            spans.push(Span::styled(
                CONFIRM_HINT,
                Style::default().fg(app.theme.text_bright).bg(bg),
            ));
            ""
        }
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
