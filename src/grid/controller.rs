use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info, trace, warn};

use crate::io::project_io::{self, ProjectError};
use crate::model::project::Project;
use crate::model::task::{Task, View};
use crate::ops::task_ops::{self, CollectionError, StatusChangeResult};
use crate::ops::vocab_ops;

use super::row_view::{Field, Focus, RowView};
use super::undo::{Action, History, HistoryError};

/// Error type for grid operations
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    PreconditionViolation(String),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Project(#[from] ProjectError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user, produced when an operation is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Supplies edited vocabularies. `None` means the user cancelled.
pub trait VocabularyEditor {
    fn edit_statuses(
        &mut self,
        active: &[String],
        inactive: &[String],
    ) -> Option<(Vec<String>, Vec<String>)>;
    fn edit_categories(&mut self, categories: &[String]) -> Option<Vec<String>>;
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Owns the project, the grid rows and the history for one open project.
///
/// Every mutation goes data first (project), then rows, then history.
/// User gestures and the `manual_*` replay API share the same primitives;
/// the replay API runs them with history muted.
pub struct GridController {
    project: Project,
    rows: RowView,
    history: History,
    showing: View,
    notice: Option<Notice>,
    clock: fn() -> NaiveDateTime,
}

impl GridController {
    pub fn new(project: Project) -> Self {
        let history = History::new(project.history.limit);
        let mut grid = GridController {
            project,
            rows: RowView::new(View::Active),
            history,
            showing: View::Active,
            notice: None,
            clock: local_now,
        };
        grid.show_task_sheet(View::Active, true);
        grid
    }

    /// Replace the time source used for created/finished stamps
    pub fn set_clock(&mut self, clock: fn() -> NaiveDateTime) {
        self.clock = clock;
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn rows(&self) -> &RowView {
        &self.rows
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The view currently displayed
    pub fn showing(&self) -> View {
        self.showing
    }

    pub fn focus(&self) -> Option<Focus> {
        self.rows.focus
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_dirty(&self) -> bool {
        self.project.dirty
    }

    // -----------------------------------------------------------------------
    // Sheet / columns
    // -----------------------------------------------------------------------

    /// Switch the displayed view. Rows are repopulated by the layout pass
    /// that runs once the rebuild bracket is released.
    pub fn show_task_sheet(&mut self, view: View, forced: bool) {
        if !forced && self.showing == view {
            return;
        }
        self.suspend_layout();
        self.showing = view;
        self.rows.clear();
        self.insert_title_row();
        self.show_hide_task_ids();
        self.show_hide_categories();
        self.rows.request_rebuild();
        self.resume_layout();
    }

    fn insert_title_row(&mut self) {
        self.rows.view = self.showing;
        self.rows.columns.show_finished = self.showing == View::Inactive;
        self.update_status_options();
        self.update_category_options();
    }

    pub fn show_hide_task_ids(&mut self) {
        self.rows.columns.show_ids = self.project.ui.show_task_ids;
    }

    /// Flip the persisted id-column preference
    pub fn toggle_task_ids(&mut self) {
        self.project.ui.show_task_ids = !self.project.ui.show_task_ids;
        self.project.dirty = true;
        self.show_hide_task_ids();
    }

    pub fn show_hide_categories(&mut self) {
        self.rows.columns.show_categories = self.project.display_categories();
    }

    fn update_status_options(&mut self) {
        self.rows.status_options = self.project.statuses.all();
    }

    fn update_category_options(&mut self) {
        self.rows.category_options = self.project.categories.labels.clone();
    }

    fn suspend_layout(&mut self) {
        self.rows.suspend_layout();
    }

    fn resume_layout(&mut self) {
        if self.rows.resume_layout() {
            self.on_layout();
        }
    }

    /// Layout pass: populate rows if a rebuild was requested
    fn on_layout(&mut self) {
        if !self.rows.take_pending_rebuild() {
            return;
        }
        trace!(view = ?self.showing, "rebuilding rows");
        self.rows.suspend_layout();
        for (i, task) in self.project.tasks(self.showing).iter().enumerate() {
            self.rows.insert_row_at(i + 1, task);
        }
        self.rows.set_tab_indexes();
        self.resume_layout();
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Focus the title cell of `row`. Rows outside the grid are ignored.
    pub fn focus_title(&mut self, row: usize, caret: usize, selection: usize) {
        let Some(slot) = self.rows.slot(row) else {
            return;
        };
        let caret = clamp_caret(&slot.title, caret);
        self.rows.focus = Some(Focus::title(row, caret, selection));
    }

    /// Move focus from one title to another. Moving up keeps the caret,
    /// moving down starts at the beginning.
    pub fn focus_adjacent(&mut self, from_row: usize, to_row: usize, caret: usize) {
        if to_row == 0 {
            return;
        }
        let caret = if from_row < to_row { 0 } else { caret };
        self.focus_title(to_row, caret, 0);
    }

    /// Focus a specific cell of a row
    pub fn focus_field(&mut self, row: usize, field: Field) {
        if self.rows.slot(row).is_none() {
            return;
        }
        self.rows.focus = Some(Focus {
            row,
            field,
            caret: 0,
            selection: 0,
        });
    }

    /// Advance focus along the tab order
    pub fn focus_next_tab_stop(&mut self) {
        let (row, field) = match self.rows.focus {
            Some(f) => (f.row, f.field),
            None => (0, Field::Title),
        };
        if let Some((row, field)) = self.rows.next_tab_stop(row, field) {
            self.focus_field(row, field);
        }
    }

    /// Focus the title at `row`, or the last row when `row` is past the end
    fn focus_title_clamped(&mut self, row: usize) {
        let last = self.rows.len();
        if last == 0 {
            self.rows.focus = None;
            return;
        }
        self.focus_title(row.clamp(1, last), 0, 0);
    }

    // -----------------------------------------------------------------------
    // Mutation primitives (project, then rows, then history)
    // -----------------------------------------------------------------------

    fn record(&mut self, action: Action) {
        if !self.history.is_muted() {
            debug!(action = %action.describe(), view = ?self.showing, "recorded");
        }
        self.history.add(action);
    }

    fn insert_row(&mut self, row: usize, task: Option<Task>) -> Result<(), GridError> {
        let view = self.showing;
        let task = match task {
            Some(task) => {
                task_ops::insert_task(&mut self.project, row, view, task.clone())?;
                task
            }
            None => task_ops::insert_new_task(&mut self.project, row, view, (self.clock)())?,
        };
        self.suspend_layout();
        self.rows.insert_row_at(row, &task);
        self.resume_layout();
        self.focus_title(row, 0, 0);
        self.record(Action::Add { view, row, task });
        Ok(())
    }

    fn delete_row(&mut self, row: usize) -> Result<(), GridError> {
        let view = self.showing;
        let task = task_ops::remove_task(&mut self.project, row, view)?;
        self.suspend_layout();
        self.rows.remove_row(row);
        self.resume_layout();
        self.focus_title_clamped(row);
        self.record(Action::Delete { view, row, task });
        Ok(())
    }

    /// Move within the displayed view. `to` is clamped to the rows that
    /// exist. Returns the row the task ended up at.
    fn move_row(&mut self, from: usize, to: usize) -> Result<usize, GridError> {
        let view = self.showing;
        let count = self.project.count(view);
        if from == 0 || from > count {
            return Err(CollectionError::OutOfRange { row: from, count }.into());
        }
        let to = to.clamp(1, count);
        if from == to {
            return Ok(from);
        }
        let task = task_ops::move_row(&mut self.project, from, to, view)?;
        self.suspend_layout();
        self.rows.remove_row(from);
        self.rows.insert_row_at(to, &task);
        self.resume_layout();
        self.focus_title(to, 0, 0);
        self.record(Action::Move { view, from, to });
        Ok(to)
    }

    fn set_title(
        &mut self,
        row: usize,
        text: &str,
        caret: usize,
        selection: usize,
    ) -> Result<(), GridError> {
        let view = self.showing;
        let old = task_ops::title(&self.project, row, view)?.to_string();
        if old != text {
            task_ops::update_title(&mut self.project, row, text, view)?;
            self.rows.set_title(row, text);
        }
        self.focus_title(row, caret, selection);
        if old != text {
            let caret = clamp_caret(text, caret);
            self.record(Action::TextChange {
                view,
                row,
                old,
                new: text.to_string(),
                caret,
            });
        }
        Ok(())
    }

    /// Change a status. `stamp` is the completion time to use when the task
    /// crosses into the inactive view (now, when not given). Returns None
    /// when the status was already `status`.
    fn set_status(
        &mut self,
        row: usize,
        status: &str,
        stamp: Option<NaiveDateTime>,
    ) -> Result<Option<StatusChangeResult>, GridError> {
        let view = self.showing;
        let task = task_ops::get_task(&self.project, row, view)?;
        if task.status == status {
            return Ok(None);
        }
        let old = task.status.clone();
        let old_completed = task.completed;
        let stamp = stamp.unwrap_or_else(self.clock);

        let result = task_ops::update_status(&mut self.project, row, status, view, stamp)?;
        let new_completed = task_ops::get_task(&self.project, result.row, result.view)?.completed;

        self.rows.set_status(row, status);
        self.rows.set_finished(row, &result.completed_text);
        if result.crossed {
            self.suspend_layout();
            self.rows.remove_row(row);
            self.resume_layout();
        }
        self.focus_title_clamped(row);
        self.record(Action::ChangeStatus {
            view,
            row,
            old,
            new: status.to_string(),
            new_view: result.view,
            new_row: result.row,
            old_completed,
            new_completed,
        });
        Ok(Some(result))
    }

    fn set_category(&mut self, row: usize, category: &str) -> Result<(), GridError> {
        let view = self.showing;
        let old = task_ops::category(&self.project, row, view)?.to_string();
        if old == category {
            return Ok(());
        }
        task_ops::update_category(&mut self.project, row, category, view)?;
        self.rows.set_category(row, category);
        self.focus_title(row, 0, 0);
        self.record(Action::ChangeCategory {
            view,
            row,
            old,
            new: category.to_string(),
        });
        Ok(())
    }

    /// Run `f` against `view` with history muted. The mute is released on
    /// every exit path.
    fn replay<T>(
        &mut self,
        view: View,
        f: impl FnOnce(&mut Self) -> Result<T, GridError>,
    ) -> Result<T, GridError> {
        self.history.off();
        self.show_task_sheet(view, false);
        let result = f(self);
        self.history.on();
        result
    }

    /// Turn an error into a user notice (or a log line for silent ones)
    fn report(&mut self, err: GridError) {
        match &err {
            GridError::InvalidInput(msg) => {
                debug!(%msg, "input rejected");
                return;
            }
            GridError::Collection(CollectionError::OutOfRange { .. }) => {
                error!(%err, "row addressing out of sync");
            }
            GridError::History(_) => {
                debug!(%err, "history boundary");
                return;
            }
            _ => warn!(%err, "operation rejected"),
        }
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            message: err.to_string(),
        });
    }

    fn inform(&mut self, message: String) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            message,
        });
    }

    // -----------------------------------------------------------------------
    // User gestures
    // -----------------------------------------------------------------------

    /// "+" on `row` (0 = header): insert a new task below it
    pub fn add_task_below(&mut self, row: usize) {
        if let Err(e) = self.insert_row(row + 1, None) {
            self.report(e);
        }
    }

    pub fn delete_task(&mut self, row: usize) {
        if let Err(e) = self.delete_row(row) {
            self.report(e);
        }
    }

    /// Keystrokes in a row-number cell, before commit
    pub fn type_row_number(&mut self, row: usize, text: &str) {
        self.rows.set_row_number_text(row, text);
    }

    /// Abandon a typed row number
    pub fn revert_row_number(&mut self, row: usize) {
        self.rows.revert_row_number(row);
    }

    /// Commit a typed row number as a move. Non-numeric input reverts the
    /// cell; targets past either end clamp to the first/last row.
    pub fn commit_row_number(&mut self, row: usize, text: &str) {
        let Some(target) = parse_row_number(text) else {
            self.rows.revert_row_number(row);
            self.report(GridError::InvalidInput(format!(
                "'{}' is not a row number",
                text
            )));
            return;
        };
        match self.move_row(row, target) {
            Ok(to) if to == row => self.rows.revert_row_number(row),
            Ok(_) => {}
            Err(e) => {
                self.rows.revert_row_number(row);
                self.report(e);
            }
        }
    }

    pub fn edit_title(&mut self, row: usize, text: &str, caret: usize) {
        if let Err(e) = self.set_title(row, text, caret, 0) {
            self.report(e);
        }
    }

    pub fn change_status(&mut self, row: usize, status: &str) {
        match self.set_status(row, status, None) {
            Ok(Some(result)) if result.crossed => {
                self.inform(format!("moved to {} tasks", result.view.label().to_lowercase()));
            }
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn change_category(&mut self, row: usize, category: &str) {
        if let Err(e) = self.set_category(row, category) {
            self.report(e);
        }
    }

    /// Delete every inactive task as one undo step. Only allowed while the
    /// inactive view is displayed.
    pub fn clear_all_inactive(&mut self) {
        if self.showing == View::Active {
            self.report(GridError::PreconditionViolation(
                "Cannot delete inactive items while active items are displayed.".into(),
            ));
            return;
        }
        let view = self.showing;
        let mut actions = Vec::new();
        let mut failure = None;
        self.history.off();
        while self.project.count(view) > 0 {
            let task = match task_ops::get_task(&self.project, 1, view) {
                Ok(task) => task.clone(),
                Err(e) => {
                    failure = Some(e.into());
                    break;
                }
            };
            if let Err(e) = self.delete_row(1) {
                failure = Some(e);
                break;
            }
            actions.push(Action::Delete { view, row: 1, task });
        }
        self.history.on();
        if !actions.is_empty() {
            info!(count = actions.len(), "cleared inactive tasks");
            self.record(Action::Multiple(actions));
        }
        if let Some(e) = failure {
            self.report(e);
        }
    }

    // -----------------------------------------------------------------------
    // Vocabularies
    // -----------------------------------------------------------------------

    pub fn edit_statuses(&mut self, editor: &mut dyn VocabularyEditor) {
        let statuses = &self.project.statuses;
        let edited = editor.edit_statuses(&statuses.active, &statuses.inactive);
        let Some((active, inactive)) = edited else {
            return;
        };
        if let Err(e) = vocab_ops::set_statuses(&mut self.project, active, inactive) {
            self.report(e.into());
            return;
        }
        self.update_status_options();
    }

    pub fn edit_categories(&mut self, editor: &mut dyn VocabularyEditor) {
        let Some(labels) = editor.edit_categories(&self.project.categories.labels) else {
            return;
        };
        if let Err(e) = vocab_ops::set_categories(&mut self.project, labels) {
            self.report(e.into());
            return;
        }
        self.update_category_options();
        self.show_hide_categories();
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Undo one step. Returns false when there was nothing to undo or the
    /// step could not be reverted; a failed step stays on the undo side.
    pub fn undo(&mut self) -> bool {
        let action = match self.history.undo() {
            Ok(action) => action,
            Err(e) => {
                self.report(e.into());
                return false;
            }
        };
        debug!(action = %action.describe(), "undo");
        if let Err(e) = action.undo(self) {
            self.history.cancel_undo();
            self.report(e);
            return false;
        }
        true
    }

    /// Redo one step. Returns false when there was nothing to redo or the
    /// step could not be re-applied; a failed step stays on the redo side.
    pub fn redo(&mut self) -> bool {
        let action = match self.history.redo() {
            Ok(action) => action,
            Err(e) => {
                self.report(e.into());
                return false;
            }
        };
        debug!(action = %action.describe(), "redo");
        if let Err(e) = action.redo(self) {
            self.history.cancel_redo();
            self.report(e);
            return false;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn save(&mut self) -> Result<(), ProjectError> {
        project_io::save_project(&mut self.project)
    }

    pub fn edited_by_outside_source(&self) -> bool {
        project_io::edited_by_outside_source(&self.project)
    }

    /// Offer a reload when the file changed behind our back. `confirm`
    /// receives the question and answers it. Returns true if reloaded.
    pub fn check_for_outside_edits(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !self.edited_by_outside_source() {
            return false;
        }
        let question = format!(
            "{} has been edited by an outside source. Reload? \
             You will lose any changes since your last save.",
            self.project.name
        );
        if !confirm(&question) {
            return false;
        }
        self.reload_project();
        true
    }

    /// Re-read the project from disk. Drops all history once the new
    /// contents are in; a failed reload keeps both project and history.
    pub fn reload_project(&mut self) {
        if let Err(e) = project_io::reload_project(&mut self.project) {
            self.report(e.into());
            return;
        }
        self.history = History::new(self.project.history.limit);
        info!(path = %self.project.path.display(), "project reloaded");
        self.show_task_sheet(self.showing, true);
    }

    // -----------------------------------------------------------------------
    // Manual (replay) API
    // -----------------------------------------------------------------------

    /// Labels carried by a replayed step may have been removed from the
    /// vocabulary since it was recorded. Put them back before applying it.
    fn restore_labels(&mut self, view: View, status: Option<&str>, category: Option<&str>) {
        let mut restored = false;
        if let Some(status) = status
            && vocab_ops::restore_status(&mut self.project, status, view)
        {
            info!(status, view = ?view, "status restored for replay");
            restored = true;
        }
        if let Some(category) = category
            && vocab_ops::restore_category(&mut self.project, category)
        {
            info!(category, "category restored for replay");
            restored = true;
        }
        if restored {
            self.update_status_options();
            self.update_category_options();
            self.show_hide_categories();
        }
    }

    /// Insert `task` (or a fresh one) at `row` of `view` without recording.
    /// A status or category the task carries that is no longer in the
    /// vocabulary is added back.
    pub fn manual_add_task(
        &mut self,
        view: View,
        row: usize,
        task: Option<Task>,
    ) -> Result<(), GridError> {
        if let Some(task) = &task {
            self.restore_labels(view, Some(&task.status), Some(&task.category));
        }
        self.replay(view, |g| g.insert_row(row, task))
    }

    pub fn manual_delete_task(&mut self, view: View, row: usize) -> Result<(), GridError> {
        self.replay(view, |g| g.delete_row(row))
    }

    pub fn manual_move_task(
        &mut self,
        view: View,
        from: usize,
        to: usize,
    ) -> Result<(), GridError> {
        self.replay(view, |g| g.move_row(from, to).map(|_| ()))
    }

    pub fn manual_text_change(
        &mut self,
        view: View,
        row: usize,
        text: &str,
        caret: usize,
        selection: usize,
    ) -> Result<(), GridError> {
        self.replay(view, |g| g.set_title(row, text, caret, selection))
    }

    /// Set a category without recording, adding it back to the vocabulary
    /// if it was removed
    pub fn manual_change_task_category(
        &mut self,
        view: View,
        row: usize,
        category: &str,
    ) -> Result<(), GridError> {
        self.restore_labels(view, None, Some(category));
        self.replay(view, |g| g.set_category(row, category))
    }

    /// Set a status starting from `view`/`row` and leave the task at
    /// `final_view`/`final_row`. A change that crosses views lands at row 1
    /// of the other view and is then moved to `final_row` there. A status
    /// missing from the vocabulary is filed under `final_view` first.
    pub fn manual_change_task_status(
        &mut self,
        view: View,
        row: usize,
        final_view: View,
        final_row: usize,
        status: &str,
        completed: Option<NaiveDateTime>,
    ) -> Result<(), GridError> {
        self.restore_labels(final_view, Some(status), None);
        self.replay(view, |g| {
            let crossed = g.set_status(row, status, completed)?;
            match crossed {
                Some(result) if result.crossed => {
                    if result.view != final_view {
                        warn!(
                            requested = ?final_view,
                            actual = ?result.view,
                            "status landed in a different view than requested"
                        );
                    }
                    g.show_task_sheet(result.view, false);
                    let to = g.move_row(result.row, final_row)?;
                    g.focus_title(to, 0, 0);
                }
                _ => {
                    if final_row != row {
                        g.move_row(row, final_row)?;
                    }
                }
            }
            Ok(())
        })
    }
}

/// Parse a typed row number. Integers too large to represent clamp to the
/// matching end. Returns None for anything that is not an integer.
fn parse_row_number(text: &str) -> Option<usize> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n.max(1) as usize);
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { 1 } else { usize::MAX })
}

/// Largest char boundary in `text` not after `caret`
fn clamp_caret(text: &str, caret: usize) -> usize {
    let mut caret = caret.min(text.len());
    while !text.is_char_boundary(caret) {
        caret -= 1;
    }
    caret
}
