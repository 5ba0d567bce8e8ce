use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::grid::controller::{GridController, Notice, NoticeLevel};
use crate::grid::row_view::Field;
use crate::io::project_io::load_project;
use crate::io::watcher::ProjectWatcher;
use crate::logging::{self, LogTarget};
use crate::model::task::View;

use super::input;
use super::render;
use super::theme::Theme;
use super::vocab_prompt::{TextVocabulary, format_categories, format_statuses};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Editing the focused title
    Edit,
    /// Typing a target row number
    RowNumber,
    /// Choosing from a status or category list
    Picker,
    /// Editing a vocabulary as one line of text
    Prompt,
    /// Waiting for y/n on a reload
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Status,
    Category,
}

/// Open status/category list
#[derive(Debug, Clone)]
pub struct Picker {
    pub kind: PickerKind,
    pub row: usize,
    pub options: Vec<String>,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Statuses,
    Categories,
}

/// Main application state
pub struct App {
    pub grid: GridController,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Text being edited in Edit, RowNumber and Prompt modes
    pub edit_buffer: String,
    /// Caret (byte offset) into `edit_buffer`
    pub edit_cursor: usize,
    pub picker: Option<Picker>,
    pub prompt: Option<PromptKind>,
    /// Reload question shown in Confirm mode
    pub confirm_text: Option<String>,
    /// First task row shown in the grid
    pub scroll_offset: usize,
    /// Messages that do not come from the grid (save failures, prompt errors)
    pub message: Option<Notice>,
}

impl App {
    pub fn new(grid: GridController) -> Self {
        let theme = Theme::from_config(&grid.project().ui);
        App {
            grid,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            edit_buffer: String::new(),
            edit_cursor: 0,
            picker: None,
            prompt: None,
            confirm_text: None,
            scroll_offset: 0,
            message: None,
        }
    }

    /// Focused row, 0 when nothing is focused
    pub fn cursor_row(&self) -> usize {
        self.grid.focus().map_or(0, |f| f.row)
    }

    pub fn set_message(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.message = Some(Notice {
            level,
            message: message.into(),
        });
    }

    /// The message to show in the status row, if any
    pub fn visible_notice(&self) -> Option<&Notice> {
        self.message.as_ref().or(self.grid.notice())
    }

    pub fn clear_notices(&mut self) {
        self.message = None;
        self.grid.take_notice();
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Move focus one row up (`-1`) or down (`1`). `caret_zero` puts the
    /// caret at the start of the new title.
    pub fn move_focus(&mut self, delta: isize, caret_zero: bool) {
        let count = self.grid.rows().len();
        if count == 0 {
            return;
        }
        let Some(focus) = self.grid.focus() else {
            self.grid.focus_title(1, 0, 0);
            return;
        };
        let target = focus.row.saturating_add_signed(delta);
        let caret = if caret_zero { 0 } else { focus.caret };
        self.grid.focus_adjacent(focus.row, target, caret);
    }

    pub fn show_view(&mut self, view: View) {
        self.grid.show_task_sheet(view, false);
        self.scroll_offset = 0;
        if self.grid.focus().is_none() && !self.grid.rows().is_empty() {
            self.grid.focus_title(1, 0, 0);
        }
    }

    /// Keep the focused row inside a window of `height` task rows
    pub fn ensure_visible(&mut self, height: usize) {
        let row = self.cursor_row();
        if row <= 1 || height == 0 {
            self.scroll_offset = 0;
            return;
        }
        let idx = row - 1;
        if idx < self.scroll_offset {
            self.scroll_offset = idx;
        } else if idx >= self.scroll_offset + height {
            self.scroll_offset = idx + 1 - height;
        }
    }

    // -----------------------------------------------------------------------
    // Title editing
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self) {
        let row = self.cursor_row();
        let Some(slot) = self.grid.rows().slot(row) else {
            return;
        };
        self.edit_buffer = slot.title.clone();
        let caret = self.grid.focus().map_or(0, |f| f.caret);
        self.edit_cursor = caret.min(self.edit_buffer.len());
        self.mode = Mode::Edit;
    }

    pub fn commit_edit(&mut self) {
        let row = self.cursor_row();
        self.grid.edit_title(row, &self.edit_buffer, self.edit_cursor);
        self.mode = Mode::Navigate;
    }

    /// Commit, then move focus keeping the caret rules of `focus_adjacent`
    pub fn commit_edit_and_move(&mut self, delta: isize) {
        let row = self.cursor_row();
        let caret = self.edit_cursor;
        self.commit_edit();
        self.grid.focus_adjacent(row, row.saturating_add_signed(delta), caret);
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Navigate;
    }

    /// Insert a task below `row` and start editing it
    pub fn add_and_edit(&mut self, row: usize) {
        let before = self.grid.project().count(self.grid.showing());
        self.grid.add_task_below(row);
        if self.grid.project().count(self.grid.showing()) > before {
            self.begin_edit();
        }
    }

    // -----------------------------------------------------------------------
    // Row number
    // -----------------------------------------------------------------------

    pub fn begin_row_number(&mut self) {
        let row = self.cursor_row();
        if row == 0 {
            return;
        }
        self.edit_buffer = row.to_string();
        self.edit_cursor = self.edit_buffer.len();
        self.grid.type_row_number(row, &self.edit_buffer);
        self.mode = Mode::RowNumber;
    }

    pub fn commit_row_number(&mut self) {
        let row = self.cursor_row();
        self.grid.commit_row_number(row, &self.edit_buffer);
        self.mode = Mode::Navigate;
    }

    pub fn cancel_row_number(&mut self) {
        let row = self.cursor_row();
        self.grid.revert_row_number(row);
        self.mode = Mode::Navigate;
    }

    // -----------------------------------------------------------------------
    // Pickers
    // -----------------------------------------------------------------------

    pub fn open_picker(&mut self, kind: PickerKind) {
        let row = self.cursor_row();
        let Some(slot) = self.grid.rows().slot(row) else {
            return;
        };
        let (status, category) = (slot.status.clone(), slot.category.clone());
        let (options, current) = match kind {
            PickerKind::Status => (self.grid.rows().status_options.clone(), status),
            PickerKind::Category => {
                if !self.grid.rows().columns.show_categories {
                    self.set_message(NoticeLevel::Info, "no categories defined (C to add some)");
                    return;
                }
                (self.grid.rows().category_options.clone(), category)
            }
        };
        let cursor = options.iter().position(|o| *o == current).unwrap_or(0);
        self.picker = Some(Picker {
            kind,
            row,
            options,
            cursor,
        });
        self.mode = Mode::Picker;
    }

    pub fn choose_picked(&mut self) {
        let Some(picker) = self.picker.take() else {
            self.mode = Mode::Navigate;
            return;
        };
        self.mode = Mode::Navigate;
        let Some(choice) = picker.options.get(picker.cursor) else {
            return;
        };
        match picker.kind {
            PickerKind::Status => self.grid.change_status(picker.row, choice),
            PickerKind::Category => self.grid.change_category(picker.row, choice),
        }
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
        self.mode = Mode::Navigate;
    }

    /// Enter on the focused cell: edit a title, open a list otherwise
    pub fn activate_focus(&mut self) {
        match self.grid.focus().map(|f| f.field) {
            Some(Field::Status) => self.open_picker(PickerKind::Status),
            Some(Field::Category) => self.open_picker(PickerKind::Category),
            Some(Field::RowNumber) => self.begin_row_number(),
            Some(Field::Title) => self.begin_edit(),
            None => {}
        }
    }

    // -----------------------------------------------------------------------
    // Vocabulary prompts
    // -----------------------------------------------------------------------

    pub fn open_prompt(&mut self, kind: PromptKind) {
        let project = self.grid.project();
        self.edit_buffer = match kind {
            PromptKind::Statuses => {
                format_statuses(&project.statuses.active, &project.statuses.inactive)
            }
            PromptKind::Categories => format_categories(&project.categories.labels),
        };
        self.edit_cursor = self.edit_buffer.len();
        self.prompt = Some(kind);
        self.mode = Mode::Prompt;
    }

    pub fn commit_prompt(&mut self) {
        let Some(kind) = self.prompt.take() else {
            self.mode = Mode::Navigate;
            return;
        };
        self.mode = Mode::Navigate;
        let text = std::mem::take(&mut self.edit_buffer);
        let mut editor = TextVocabulary::new(&text);
        match kind {
            PromptKind::Statuses => self.grid.edit_statuses(&mut editor),
            PromptKind::Categories => self.grid.edit_categories(&mut editor),
        }
        if let Some(err) = editor.error {
            self.set_message(NoticeLevel::Error, err);
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.mode = Mode::Navigate;
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save if the last key changed the project
    pub fn autosave(&mut self) {
        if !self.grid.is_dirty() {
            return;
        }
        if let Err(e) = self.grid.save() {
            warn!(error = %e, "autosave failed");
            self.set_message(NoticeLevel::Error, format!("save failed: {}", e));
        }
    }

    /// The watcher saw the project file change
    pub fn on_file_changed(&mut self) {
        if self.mode == Mode::Confirm {
            return;
        }
        let mut question = None;
        self.grid.check_for_outside_edits(|q| {
            question = Some(q.to_string());
            false
        });
        if let Some(q) = question {
            self.confirm_text = Some(q);
            self.mode = Mode::Confirm;
        }
    }

    pub fn answer_reload(&mut self, reload: bool) {
        self.confirm_text = None;
        self.mode = Mode::Navigate;
        if reload {
            self.grid.reload_project();
            self.theme = Theme::from_config(&self.grid.project().ui);
            self.scroll_offset = 0;
        }
    }
}

/// Run the TUI on the project file at `path`
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogTarget::File, path);
    let project = load_project(path)?;
    let mut app = App::new(GridController::new(project));
    app.show_view(View::Active);

    let watcher = match ProjectWatcher::start(path) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watching unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());
    app.autosave();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&ProjectWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            app.autosave();
        }

        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            app.on_file_changed();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::app_with;

    #[test]
    fn test_move_focus_clamps_at_ends() {
        let mut app = app_with(&["A", "B"]);
        app.grid.focus_title(1, 0, 0);
        app.move_focus(-1, false);
        assert_eq!(app.cursor_row(), 1);
        app.move_focus(1, false);
        app.move_focus(1, false);
        assert_eq!(app.cursor_row(), 2);
    }

    #[test]
    fn test_edit_commit_records_text_change() {
        let mut app = app_with(&["A"]);
        app.grid.focus_title(1, 0, 0);
        app.begin_edit();
        app.edit_buffer.push_str("pples");
        app.edit_cursor = app.edit_buffer.len();
        app.commit_edit();
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.grid.rows().slot(1).unwrap().title, "Apples");
        assert_eq!(app.grid.focus().unwrap().caret, 6);
    }

    #[test]
    fn test_cancel_edit_keeps_title() {
        let mut app = app_with(&["A"]);
        app.grid.focus_title(1, 0, 0);
        app.begin_edit();
        app.edit_buffer = "changed".into();
        app.cancel_edit();
        assert_eq!(app.grid.rows().slot(1).unwrap().title, "A");
    }

    #[test]
    fn test_picker_changes_status() {
        let mut app = app_with(&["A", "B"]);
        app.grid.focus_title(2, 0, 0);
        app.open_picker(PickerKind::Status);
        assert_eq!(app.mode, Mode::Picker);
        let picker = app.picker.as_mut().unwrap();
        assert_eq!(picker.cursor, 0);
        picker.cursor = 2;
        app.choose_picked();
        assert_eq!(app.grid.project().inactive[0].description, "B");
        assert_eq!(app.grid.rows().len(), 1);
    }

    #[test]
    fn test_category_picker_needs_categories() {
        let mut app = app_with(&["A"]);
        app.grid.focus_title(1, 0, 0);
        app.open_picker(PickerKind::Category);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.visible_notice().is_some());
    }

    #[test]
    fn test_prompt_updates_statuses() {
        let mut app = app_with(&["A"]);
        app.open_prompt(PromptKind::Statuses);
        assert_eq!(app.edit_buffer, "Todo, Doing | Done");
        app.edit_buffer = "Todo, Waiting | Done".into();
        app.commit_prompt();
        assert_eq!(app.grid.project().statuses.active, vec!["Todo", "Waiting"]);

        app.open_prompt(PromptKind::Statuses);
        app.edit_buffer = "no bar here".into();
        app.commit_prompt();
        assert_eq!(app.visible_notice().unwrap().level, NoticeLevel::Error);
    }

    #[test]
    fn test_row_number_mode_moves_task() {
        let mut app = app_with(&["A", "B", "C"]);
        app.grid.focus_title(3, 0, 0);
        app.begin_row_number();
        assert_eq!(app.edit_buffer, "3");
        app.edit_buffer = "1".into();
        app.commit_row_number();
        assert_eq!(app.grid.rows().slot(1).unwrap().title, "C");
        assert_eq!(app.cursor_row(), 1);
    }

    #[test]
    fn test_ensure_visible_scrolls() {
        let titles: Vec<String> = (1..=20).map(|i| format!("T{}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let mut app = app_with(&refs);
        app.grid.focus_title(15, 0, 0);
        app.ensure_visible(5);
        assert_eq!(app.scroll_offset, 10);
        app.grid.focus_title(12, 0, 0);
        app.ensure_visible(5);
        assert_eq!(app.scroll_offset, 10);
        app.grid.focus_title(1, 0, 0);
        app.ensure_visible(5);
        assert_eq!(app.scroll_offset, 0);
    }
}
