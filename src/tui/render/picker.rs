use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, PickerKind};
use crate::util::unicode::{display_width, fit_to_width};

/// Render the status/category list over the grid
pub fn render_picker(frame: &mut Frame, app: &App, area: Rect) {
    let Some(picker) = &app.picker else {
        return;
    };
    let bg = app.theme.background;
    let title = match picker.kind {
        PickerKind::Status => " Status ",
        PickerKind::Category => " Category ",
    };

    let widest = picker
        .options
        .iter()
        .map(|o| display_width(o))
        .max()
        .unwrap_or(0)
        .max(display_width(title));
    let inner_w = widest + 4;
    let popup_w = ((inner_w + 2) as u16).min(area.width);
    let popup_h = ((picker.options.len() + 2) as u16).min(area.height);
    let popup = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, popup);

    let lines: Vec<Line> = picker
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            // Empty category shows as a dash so it can be picked
            let label = if option.is_empty() { "\u{2014}" } else { option };
            let text = fit_to_width(&format!(" {} ", label), inner_w);
            let style = if i == picker.cursor {
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text).bg(bg)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
