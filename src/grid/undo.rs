use chrono::NaiveDateTime;

use crate::model::task::{Task, View};

use super::controller::{GridController, GridError};

const UNDO_STACK_LIMIT: usize = 500;

/// Error type for history navigation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// A single reversible grid mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A task was inserted. Keeps the task so redo recreates it exactly.
    Add { view: View, row: usize, task: Task },
    /// A task was deleted
    Delete { view: View, row: usize, task: Task },
    /// A task was moved within its view
    Move { view: View, from: usize, to: usize },
    /// A title was edited
    TextChange {
        view: View,
        row: usize,
        old: String,
        new: String,
        /// Caret after the edit, restored on redo
        caret: usize,
    },
    /// A status was changed. When the change crossed between views the
    /// task ended up at `new_view`/`new_row`.
    ChangeStatus {
        view: View,
        row: usize,
        old: String,
        new: String,
        new_view: View,
        new_row: usize,
        old_completed: Option<NaiveDateTime>,
        new_completed: Option<NaiveDateTime>,
    },
    /// A category was changed
    ChangeCategory {
        view: View,
        row: usize,
        old: String,
        new: String,
    },
    /// Several actions applied as one undo step
    Multiple(Vec<Action>),
}

impl Action {
    /// Revert this action through the grid's manual API
    pub fn undo(&self, grid: &mut GridController) -> Result<(), GridError> {
        apply_inverse(self, grid)
    }

    /// Re-apply this action through the grid's manual API
    pub fn redo(&self, grid: &mut GridController) -> Result<(), GridError> {
        apply_forward(self, grid)
    }

    /// Short label for logs and notices
    pub fn describe(&self) -> String {
        match self {
            Action::Add { row, .. } => format!("add row {}", row),
            Action::Delete { row, .. } => format!("delete row {}", row),
            Action::Move { from, to, .. } => format!("move row {} to {}", from, to),
            Action::TextChange { row, .. } => format!("edit row {}", row),
            Action::ChangeStatus { row, new, .. } => format!("set row {} to {}", row, new),
            Action::ChangeCategory { row, new, .. } => {
                if new.is_empty() {
                    format!("clear category of row {}", row)
                } else {
                    format!("set row {} category to {}", row, new)
                }
            }
            Action::Multiple(actions) => format!("{} changes", actions.len()),
        }
    }
}

/// Linear undo/redo history with a mute switch for replay
#[derive(Debug)]
pub struct History {
    undo: Vec<Action>,
    redo: Vec<Action>,
    limit: usize,
    /// Mute depth; `add` is ignored while above zero
    muted: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(UNDO_STACK_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            muted: 0,
        }
    }

    /// Record an action. Clears the redo tail. Ignored while muted.
    pub fn add(&mut self, action: Action) {
        if self.is_muted() {
            return;
        }
        self.undo.push(action);
        if self.undo.len() > self.limit {
            self.undo.drain(..self.undo.len() - self.limit);
        }
        self.redo.clear();
    }

    /// Step back. The caller applies the inverse of the returned action.
    pub fn undo(&mut self) -> Result<Action, HistoryError> {
        let action = self.undo.pop().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(action.clone());
        Ok(action)
    }

    /// Step forward. The caller re-applies the returned action.
    pub fn redo(&mut self) -> Result<Action, HistoryError> {
        let action = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.undo.push(action.clone());
        Ok(action)
    }

    /// Put back the action returned by the last `undo` because its inverse
    /// could not be applied. The cursor returns to where it was.
    pub fn cancel_undo(&mut self) {
        if let Some(action) = self.redo.pop() {
            self.undo.push(action);
        }
    }

    /// Put back the action returned by the last `redo` because it could
    /// not be re-applied.
    pub fn cancel_redo(&mut self) {
        if let Some(action) = self.undo.pop() {
            self.redo.push(action);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Mute recording. Nests; each `off` needs a matching `on`.
    pub fn off(&mut self) {
        self.muted += 1;
    }

    pub fn on(&mut self) {
        self.muted = self.muted.saturating_sub(1);
    }

    pub fn is_muted(&self) -> bool {
        self.muted > 0
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of undoable actions
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&Action> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&Action> {
        self.redo.last()
    }
}

/// Apply the inverse of an action (for undo)
fn apply_inverse(action: &Action, grid: &mut GridController) -> Result<(), GridError> {
    match action {
        Action::Add { view, row, .. } => grid.manual_delete_task(*view, *row),
        Action::Delete { view, row, task } => {
            grid.manual_add_task(*view, *row, Some(task.clone()))
        }
        Action::Move { view, from, to } => grid.manual_move_task(*view, *to, *from),
        Action::TextChange { view, row, old, .. } => {
            grid.manual_text_change(*view, *row, old, old.len(), 0)
        }
        Action::ChangeStatus {
            view,
            row,
            old,
            new_view,
            new_row,
            old_completed,
            ..
        } => grid.manual_change_task_status(
            *new_view,
            *new_row,
            *view,
            *row,
            old,
            *old_completed,
        ),
        Action::ChangeCategory { view, row, old, .. } => {
            grid.manual_change_task_category(*view, *row, old)
        }
        Action::Multiple(actions) => {
            for action in actions.iter().rev() {
                apply_inverse(action, grid)?;
            }
            Ok(())
        }
    }
}

/// Apply an action forward (for redo)
fn apply_forward(action: &Action, grid: &mut GridController) -> Result<(), GridError> {
    match action {
        Action::Add { view, row, task } => {
            grid.manual_add_task(*view, *row, Some(task.clone()))
        }
        Action::Delete { view, row, .. } => grid.manual_delete_task(*view, *row),
        Action::Move { view, from, to } => grid.manual_move_task(*view, *from, *to),
        Action::TextChange {
            view,
            row,
            new,
            caret,
            ..
        } => grid.manual_text_change(*view, *row, new, *caret, 0),
        Action::ChangeStatus {
            view,
            row,
            new,
            new_view,
            new_row,
            new_completed,
            ..
        } => grid.manual_change_task_status(
            *view,
            *row,
            *new_view,
            *new_row,
            new,
            *new_completed,
        ),
        Action::ChangeCategory { view, row, new, .. } => {
            grid.manual_change_task_category(*view, *row, new)
        }
        Action::Multiple(actions) => {
            for action in actions {
                apply_forward(action, grid)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: usize, to: usize) -> Action {
        Action::Move {
            view: View::Active,
            from,
            to,
        }
    }

    // -----------------------------------------------------------------------
    // History core
    // -----------------------------------------------------------------------

    #[test]
    fn new_history_is_empty() {
        let history = History::default();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.peek_undo().is_none());
    }

    #[test]
    fn undo_on_empty_history_fails() {
        let mut history = History::default();
        assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn undo_then_redo_walks_the_cursor() {
        let mut history = History::default();
        history.add(mv(1, 2));
        history.add(mv(2, 3));
        assert_eq!(history.undo().unwrap(), mv(2, 3));
        assert_eq!(history.undo().unwrap(), mv(1, 2));
        assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo().unwrap(), mv(1, 2));
        assert_eq!(history.peek_redo(), Some(&mv(2, 3)));
        assert_eq!(history.peek_undo(), Some(&mv(1, 2)));
    }

    #[test]
    fn add_truncates_redo_tail() {
        let mut history = History::default();
        history.add(mv(1, 2));
        history.add(mv(2, 3));
        history.undo().unwrap();
        assert!(history.can_redo());
        history.add(mv(4, 5));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn muted_add_is_ignored() {
        let mut history = History::default();
        history.off();
        history.add(mv(1, 2));
        assert!(history.is_empty());
        history.on();
        history.add(mv(1, 2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn mute_nests() {
        let mut history = History::default();
        history.off();
        history.off();
        history.on();
        assert!(history.is_muted());
        history.on();
        assert!(!history.is_muted());
        history.on();
        assert!(!history.is_muted());
    }

    #[test]
    fn muted_add_keeps_redo_tail() {
        let mut history = History::default();
        history.add(mv(1, 2));
        history.undo().unwrap();
        history.off();
        history.add(mv(3, 4));
        history.on();
        assert!(history.can_redo());
    }

    #[test]
    fn limit_drops_oldest() {
        let mut history = History::new(3);
        for i in 1..=5 {
            history.add(mv(i, i + 1));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().unwrap(), mv(5, 6));
        assert_eq!(history.undo().unwrap(), mv(4, 5));
        assert_eq!(history.undo().unwrap(), mv(3, 4));
        assert!(history.undo().is_err());
    }

    #[test]
    fn default_limit_is_enforced() {
        let mut history = History::default();
        for i in 0..=UNDO_STACK_LIMIT {
            history.add(mv(i, i + 1));
        }
        assert_eq!(history.len(), UNDO_STACK_LIMIT);
    }

    #[test]
    fn clear_drops_everything() {
        let mut history = History::default();
        history.add(mv(1, 2));
        history.add(mv(2, 3));
        history.undo().unwrap();
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn cancel_returns_action_to_its_side() {
        let mut history = History::default();
        history.add(mv(1, 2));
        history.add(mv(2, 3));
        history.undo().unwrap();
        history.cancel_undo();
        assert_eq!(history.peek_undo(), Some(&mv(2, 3)));
        assert!(!history.can_redo());

        history.undo().unwrap();
        history.undo().unwrap();
        history.redo().unwrap();
        history.cancel_redo();
        assert!(!history.can_undo());
        assert_eq!(history.peek_redo(), Some(&mv(1, 2)));
        assert_eq!(history.redo().unwrap(), mv(1, 2));
        assert_eq!(history.redo().unwrap(), mv(2, 3));
    }

    #[test]
    fn describe_actions() {
        assert_eq!(mv(3, 1).describe(), "move row 3 to 1");
        assert_eq!(Action::Multiple(vec![mv(1, 2), mv(2, 1)]).describe(), "2 changes");
        let cat = Action::ChangeCategory {
            view: View::Active,
            row: 2,
            old: "Work".into(),
            new: String::new(),
        };
        assert_eq!(cat.describe(), "clear category of row 2");
    }
}
