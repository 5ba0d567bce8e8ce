use serde::Serialize;

use crate::model::task::{Task, View};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub row: usize,
    pub id: u64,
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub view: View,
    pub tasks: Vec<TaskJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(row: usize, task: &Task) -> TaskJson {
    TaskJson {
        row,
        id: task.id,
        description: task.description.clone(),
        status: task.status.clone(),
        category: task.category.clone(),
        created: task.created_text(),
        completed: task.completed.map(|_| task.completed_text()),
    }
}

pub fn task_list_to_json(view: View, tasks: &[Task]) -> TaskListJson {
    TaskListJson {
        view,
        tasks: tasks
            .iter()
            .enumerate()
            .map(|(i, t)| task_to_json(i + 1, t))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary: `3. [Todo] Buy milk (#7)`
pub fn format_task_line(row: usize, task: &Task) -> String {
    let category = if task.category.is_empty() {
        String::new()
    } else {
        format!(" @{}", task.category)
    };
    let finished = task
        .completed
        .map(|_| format!(" done {}", task.completed_text()))
        .unwrap_or_default();
    format!(
        "{}. [{}] {}{} (#{}){}",
        row, task.status, task.description, category, task.id, finished
    )
}
