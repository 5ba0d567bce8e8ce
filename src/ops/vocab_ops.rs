use std::collections::HashSet;

use crate::model::project::Project;
use crate::model::task::View;

use super::task_ops::CollectionError;

/// Replace the status vocabulary.
///
/// Rejected (and nothing changes) when either list is empty, a label is
/// blank or repeated, the lists overlap, or a status that some task uses
/// would disappear or switch between active and inactive.
pub fn set_statuses(
    project: &mut Project,
    active: Vec<String>,
    inactive: Vec<String>,
) -> Result<(), CollectionError> {
    let active: Vec<String> = active.into_iter().map(|s| s.trim().to_string()).collect();
    let inactive: Vec<String> = inactive.into_iter().map(|s| s.trim().to_string()).collect();

    if active.is_empty() {
        return Err(invalid("at least one active status is required"));
    }
    if inactive.is_empty() {
        return Err(invalid("at least one inactive status is required"));
    }

    let mut seen = HashSet::new();
    for label in active.iter().chain(inactive.iter()) {
        if label.is_empty() {
            return Err(invalid("status names cannot be blank"));
        }
        if !seen.insert(label.as_str()) {
            return Err(invalid(&format!("status '{}' is listed more than once", label)));
        }
    }

    for view in [View::Active, View::Inactive] {
        let allowed = match view {
            View::Active => &active,
            View::Inactive => &inactive,
        };
        for task in project.tasks(view) {
            if allowed.contains(&task.status) {
                continue;
            }
            let msg = if active.contains(&task.status) || inactive.contains(&task.status) {
                format!(
                    "status '{}' is in use by {} tasks and cannot change sides",
                    task.status,
                    view.label().to_lowercase()
                )
            } else {
                format!("status '{}' is in use and cannot be removed", task.status)
            };
            return Err(invalid(&msg));
        }
    }

    project.statuses.active = active;
    project.statuses.inactive = inactive;
    project.dirty = true;
    Ok(())
}

/// Replace the category vocabulary. Categories in use cannot be removed.
pub fn set_categories(project: &mut Project, labels: Vec<String>) -> Result<(), CollectionError> {
    let labels: Vec<String> = labels.into_iter().map(|s| s.trim().to_string()).collect();

    let mut seen = HashSet::new();
    for label in &labels {
        if !seen.insert(label.as_str()) {
            return Err(invalid(&format!("category '{}' is listed more than once", label)));
        }
    }

    let in_use = project
        .active
        .iter()
        .chain(project.inactive.iter())
        .find(|t| !labels.contains(&t.category));
    if let Some(task) = in_use {
        let name = if task.category.is_empty() {
            "(none)"
        } else {
            task.category.as_str()
        };
        return Err(invalid(&format!("category '{}' is in use and cannot be removed", name)));
    }

    project.categories.labels = labels;
    project.dirty = true;
    Ok(())
}

/// File a status that is missing from the vocabulary under `view`.
/// Returns false when the label is already known or blank.
pub fn restore_status(project: &mut Project, label: &str, view: View) -> bool {
    if label.trim().is_empty() || project.statuses.classify(label).is_some() {
        return false;
    }
    let list = match view {
        View::Active => &mut project.statuses.active,
        View::Inactive => &mut project.statuses.inactive,
    };
    list.push(label.to_string());
    project.dirty = true;
    true
}

/// Add a category that is missing from the vocabulary. The empty
/// category goes first. Returns false when the label is already known.
pub fn restore_category(project: &mut Project, label: &str) -> bool {
    let labels = &mut project.categories.labels;
    if labels.iter().any(|c| c == label) {
        return false;
    }
    if label.is_empty() {
        labels.insert(0, String::new());
    } else {
        labels.push(label.to_string());
    }
    project.dirty = true;
    true
}

fn invalid(msg: &str) -> CollectionError {
    CollectionError::InvalidVocabulary(msg.to_string())
}
