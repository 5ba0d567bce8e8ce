use chrono::NaiveDateTime;

use crate::model::project::Project;
use crate::model::task::{Task, View};

/// Error type for task collection operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("row {row} is out of range (view has {count} rows)")]
    OutOfRange { row: usize, count: usize },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("{0}")]
    InvalidVocabulary(String),
}

/// Outcome of a status update, so the caller does not have to re-derive
/// the active/inactive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeResult {
    /// The task moved to the other view
    pub crossed: bool,
    /// Where the task lives now
    pub view: View,
    pub row: usize,
    /// Finished-column text after the change
    pub completed_text: String,
}

// ---------------------------------------------------------------------------
// Row addressing
// ---------------------------------------------------------------------------

/// Convert a 1-based row into a vector index, checking bounds
fn index_of(project: &Project, row: usize, view: View) -> Result<usize, CollectionError> {
    let count = project.count(view);
    if row == 0 || row > count {
        return Err(CollectionError::OutOfRange { row, count });
    }
    Ok(row - 1)
}

pub fn get_task(project: &Project, row: usize, view: View) -> Result<&Task, CollectionError> {
    let idx = index_of(project, row, view)?;
    Ok(&project.tasks(view)[idx])
}

fn get_task_mut(
    project: &mut Project,
    row: usize,
    view: View,
) -> Result<&mut Task, CollectionError> {
    let idx = index_of(project, row, view)?;
    Ok(&mut project.tasks_mut(view)[idx])
}

// ---------------------------------------------------------------------------
// Insert / remove / move
// ---------------------------------------------------------------------------

/// Insert `task` at `row`, shifting later rows down by one.
/// The task's status (and completion stamp) must already match `view`.
pub fn insert_task(
    project: &mut Project,
    row: usize,
    view: View,
    task: Task,
) -> Result<(), CollectionError> {
    let count = project.count(view);
    if row == 0 || row > count + 1 {
        return Err(CollectionError::OutOfRange { row, count });
    }
    match project.statuses.classify(&task.status) {
        Some(v) if v == view => {}
        Some(v) => {
            return Err(CollectionError::InvalidState(format!(
                "status '{}' belongs to the {} view, not {}",
                task.status,
                v.label().to_lowercase(),
                view.label().to_lowercase()
            )));
        }
        None => {
            return Err(CollectionError::InvalidVocabulary(format!(
                "unknown status '{}'",
                task.status
            )));
        }
    }
    if task.completed.is_some() != (view == View::Inactive) {
        return Err(CollectionError::InvalidState(format!(
            "task {} has a completion date inconsistent with its status",
            task.id
        )));
    }
    if project.locate(task.id).is_some() {
        return Err(CollectionError::InvalidState(format!(
            "task {} is already in the project",
            task.id
        )));
    }
    if task.id >= project.next_id {
        project.next_id = task.id + 1;
    }
    project.tasks_mut(view).insert(row - 1, task);
    project.dirty = true;
    Ok(())
}

/// Create a task with default status/category and insert it at `row`.
pub fn insert_new_task(
    project: &mut Project,
    row: usize,
    view: View,
    now: NaiveDateTime,
) -> Result<Task, CollectionError> {
    let status = project
        .statuses
        .default_for(view)
        .ok_or_else(|| {
            CollectionError::InvalidVocabulary(format!(
                "no {} statuses defined",
                view.label().to_lowercase()
            ))
        })?
        .to_string();
    let category = project.categories.labels.first().cloned().unwrap_or_default();
    let mut task = Task::new(project.next_id, status, category, now);
    if view == View::Inactive {
        task.completed = Some(now);
    }
    insert_task(project, row, view, task.clone())?;
    Ok(task)
}

/// Remove the task at `row`, closing the gap.
pub fn remove_task(project: &mut Project, row: usize, view: View) -> Result<Task, CollectionError> {
    let idx = index_of(project, row, view)?;
    project.dirty = true;
    Ok(project.tasks_mut(view).remove(idx))
}

/// Move the task at `from` to `to` within one view. Both rows must be in range.
pub fn move_row(
    project: &mut Project,
    from: usize,
    to: usize,
    view: View,
) -> Result<Task, CollectionError> {
    let from_idx = index_of(project, from, view)?;
    let to_idx = index_of(project, to, view)?;
    if from_idx == to_idx {
        return Ok(project.tasks(view)[from_idx].clone());
    }
    let tasks = project.tasks_mut(view);
    let task = tasks.remove(from_idx);
    tasks.insert(to_idx, task.clone());
    project.dirty = true;
    Ok(task)
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

pub fn title(project: &Project, row: usize, view: View) -> Result<&str, CollectionError> {
    Ok(&get_task(project, row, view)?.description)
}

pub fn update_title(
    project: &mut Project,
    row: usize,
    value: &str,
    view: View,
) -> Result<(), CollectionError> {
    let task = get_task_mut(project, row, view)?;
    if task.description == value {
        return Ok(());
    }
    task.description = value.to_string();
    project.dirty = true;
    Ok(())
}

pub fn category(project: &Project, row: usize, view: View) -> Result<&str, CollectionError> {
    Ok(&get_task(project, row, view)?.category)
}

pub fn update_category(
    project: &mut Project,
    row: usize,
    value: &str,
    view: View,
) -> Result<(), CollectionError> {
    if !project.categories.labels.iter().any(|c| c == value) {
        return Err(CollectionError::InvalidVocabulary(format!(
            "unknown category '{}'",
            value
        )));
    }
    let task = get_task_mut(project, row, view)?;
    if task.category == value {
        return Ok(());
    }
    task.category = value.to_string();
    project.dirty = true;
    Ok(())
}

pub fn status(project: &Project, row: usize, view: View) -> Result<&str, CollectionError> {
    Ok(&get_task(project, row, view)?.status)
}

/// Replace a task's status. When the new status is classified in the other
/// view the task is relocated to row 1 of that view in the same step and
/// its completion stamp is set to `stamp` (into inactive) or cleared.
pub fn update_status(
    project: &mut Project,
    row: usize,
    value: &str,
    view: View,
    stamp: NaiveDateTime,
) -> Result<StatusChangeResult, CollectionError> {
    let target = project.statuses.classify(value).ok_or_else(|| {
        CollectionError::InvalidVocabulary(format!("unknown status '{}'", value))
    })?;
    let idx = index_of(project, row, view)?;

    if target == view {
        let task = &mut project.tasks_mut(view)[idx];
        let changed = task.status != value;
        task.status = value.to_string();
        let completed_text = task.completed_text();
        if changed {
            project.dirty = true;
        }
        return Ok(StatusChangeResult {
            crossed: false,
            view,
            row,
            completed_text,
        });
    }

    let mut task = project.tasks_mut(view).remove(idx);
    task.status = value.to_string();
    task.completed = match target {
        View::Inactive => Some(stamp),
        View::Active => None,
    };
    let completed_text = task.completed_text();
    project.tasks_mut(target).insert(0, task);
    project.dirty = true;
    Ok(StatusChangeResult {
        crossed: true,
        view: target,
        row: 1,
        completed_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn project_with(titles: &[&str]) -> Project {
        let mut project = Project::new("test", PathBuf::from("/tmp/tasks.toml"));
        for (i, title) in titles.iter().enumerate() {
            let task = insert_new_task(&mut project, i + 1, View::Active, now()).unwrap();
            update_title(&mut project, i + 1, title, View::Active).unwrap();
            assert_eq!(task.id, i as u64 + 1);
        }
        project
    }

    fn titles(project: &Project, view: View) -> Vec<String> {
        project.tasks(view).iter().map(|t| t.description.clone()).collect()
    }

    #[test]
    fn get_task_out_of_range() {
        let project = project_with(&["A"]);
        assert_eq!(
            get_task(&project, 0, View::Active).unwrap_err(),
            CollectionError::OutOfRange { row: 0, count: 1 }
        );
        assert_eq!(
            get_task(&project, 2, View::Active).unwrap_err(),
            CollectionError::OutOfRange { row: 2, count: 1 }
        );
        assert!(get_task(&project, 1, View::Inactive).is_err());
    }

    #[test]
    fn insert_new_task_defaults() {
        let mut project = project_with(&[]);
        let task = insert_new_task(&mut project, 1, View::Active, now()).unwrap();
        assert_eq!(task.status, "Todo");
        assert_eq!(task.category, "");
        assert_eq!(task.created, now());
        assert_eq!(task.completed, None);
        assert_eq!(project.next_id, 2);

        let done = insert_new_task(&mut project, 1, View::Inactive, now()).unwrap();
        assert_eq!(done.status, "Done");
        assert_eq!(done.completed, Some(now()));
        assert_eq!(done.id, 2);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut project = project_with(&["A", "B"]);
        remove_task(&mut project, 2, View::Active).unwrap();
        let task = insert_new_task(&mut project, 2, View::Active, now()).unwrap();
        assert_eq!(task.id, 3);
    }

    #[test]
    fn insert_shifts_later_rows() {
        let mut project = project_with(&["A", "B"]);
        insert_new_task(&mut project, 2, View::Active, now()).unwrap();
        update_title(&mut project, 2, "X", View::Active).unwrap();
        assert_eq!(titles(&project, View::Active), vec!["A", "X", "B"]);
    }

    #[test]
    fn insert_rejects_wrong_view() {
        let mut project = project_with(&["A"]);
        let task = get_task(&project, 1, View::Active).unwrap().clone();
        let mut clone = task.clone();
        clone.id = 99;
        assert!(matches!(
            insert_task(&mut project, 1, View::Inactive, clone),
            Err(CollectionError::InvalidState(_))
        ));
        // same id twice
        assert!(matches!(
            insert_task(&mut project, 1, View::Active, task),
            Err(CollectionError::InvalidState(_))
        ));
    }

    #[test]
    fn insert_past_end_is_out_of_range() {
        let mut project = project_with(&["A"]);
        assert!(matches!(
            insert_new_task(&mut project, 3, View::Active, now()),
            Err(CollectionError::OutOfRange { row: 3, count: 1 })
        ));
    }

    #[test]
    fn remove_closes_gap() {
        let mut project = project_with(&["A", "B", "C"]);
        let removed = remove_task(&mut project, 2, View::Active).unwrap();
        assert_eq!(removed.description, "B");
        assert_eq!(titles(&project, View::Active), vec!["A", "C"]);
    }

    #[test]
    fn move_row_up_and_down() {
        let mut project = project_with(&["A", "B", "C"]);
        move_row(&mut project, 3, 1, View::Active).unwrap();
        assert_eq!(titles(&project, View::Active), vec!["C", "A", "B"]);
        move_row(&mut project, 1, 3, View::Active).unwrap();
        assert_eq!(titles(&project, View::Active), vec!["A", "B", "C"]);
    }

    #[test]
    fn move_row_same_row_is_noop() {
        let mut project = project_with(&["A", "B"]);
        project.dirty = false;
        let task = move_row(&mut project, 2, 2, View::Active).unwrap();
        assert_eq!(task.description, "B");
        assert!(!project.dirty);
    }

    #[test]
    fn update_status_within_view() {
        let mut project = project_with(&["A"]);
        let result = update_status(&mut project, 1, "Doing", View::Active, now()).unwrap();
        assert_eq!(
            result,
            StatusChangeResult {
                crossed: false,
                view: View::Active,
                row: 1,
                completed_text: String::new(),
            }
        );
        assert_eq!(status(&project, 1, View::Active).unwrap(), "Doing");
    }

    #[test]
    fn update_status_crosses_boundary() {
        let mut project = project_with(&["A", "B", "C"]);
        let result = update_status(&mut project, 2, "Done", View::Active, now()).unwrap();
        assert!(result.crossed);
        assert_eq!(result.view, View::Inactive);
        assert_eq!(result.row, 1);
        assert_eq!(result.completed_text, "2026-05-01");
        assert_eq!(titles(&project, View::Active), vec!["A", "C"]);
        let moved = get_task(&project, 1, View::Inactive).unwrap();
        assert_eq!(moved.description, "B");
        assert_eq!(moved.completed, Some(now()));

        let back = update_status(&mut project, 1, "Todo", View::Inactive, now()).unwrap();
        assert!(back.crossed);
        assert_eq!(back.view, View::Active);
        let reopened = get_task(&project, 1, View::Active).unwrap();
        assert_eq!(reopened.description, "B");
        assert_eq!(reopened.completed, None);
    }

    #[test]
    fn unknown_labels_rejected() {
        let mut project = project_with(&["A"]);
        assert!(matches!(
            update_status(&mut project, 1, "Someday", View::Active, now()),
            Err(CollectionError::InvalidVocabulary(_))
        ));
        assert!(matches!(
            update_category(&mut project, 1, "Garden", View::Active),
            Err(CollectionError::InvalidVocabulary(_))
        ));
        assert_eq!(status(&project, 1, View::Active).unwrap(), "Todo");
    }

    #[test]
    fn category_update() {
        let mut project = project_with(&["A"]);
        project.categories.labels.push("Errands".into());
        update_category(&mut project, 1, "Errands", View::Active).unwrap();
        assert_eq!(category(&project, 1, View::Active).unwrap(), "Errands");
    }
}
