use std::path::PathBuf;

use super::config::{CategoryConfig, HistoryConfig, StatusConfig, UiConfig};
use super::task::{Task, View};

/// A loaded task project: vocabularies, settings and the two task views
#[derive(Debug, Clone)]
pub struct Project {
    /// Path of the project file
    pub path: PathBuf,
    pub name: String,
    /// Next id handed out by `insert_new_task`
    pub next_id: u64,
    pub statuses: StatusConfig,
    pub categories: CategoryConfig,
    pub ui: UiConfig,
    pub history: HistoryConfig,
    /// Active view, in display order
    pub active: Vec<Task>,
    /// Inactive view, in display order
    pub inactive: Vec<Task>,
    /// Changed since the last save
    pub dirty: bool,
    /// The file text as last read or written by this process
    pub disk_text: Option<String>,
}

impl Project {
    /// An empty, unsaved project with default vocabularies
    pub fn new(name: &str, path: PathBuf) -> Self {
        Project {
            path,
            name: name.to_string(),
            next_id: 1,
            statuses: StatusConfig::default(),
            categories: CategoryConfig::default(),
            ui: UiConfig::default(),
            history: HistoryConfig::default(),
            active: Vec::new(),
            inactive: Vec::new(),
            dirty: false,
            disk_text: None,
        }
    }

    pub fn tasks(&self, view: View) -> &[Task] {
        match view {
            View::Active => &self.active,
            View::Inactive => &self.inactive,
        }
    }

    pub fn tasks_mut(&mut self, view: View) -> &mut Vec<Task> {
        match view {
            View::Active => &mut self.active,
            View::Inactive => &mut self.inactive,
        }
    }

    pub fn count(&self, view: View) -> usize {
        self.tasks(view).len()
    }

    /// Category column is only worth showing when there is a choice
    pub fn display_categories(&self) -> bool {
        self.categories.labels.len() > 1
    }

    /// Find a task by id in either view. Returns the view and 1-based row.
    pub fn locate(&self, id: u64) -> Option<(View, usize)> {
        for view in [View::Active, View::Inactive] {
            if let Some(idx) = self.tasks(view).iter().position(|t| t.id == id) {
                return Some((view, idx + 1));
            }
        }
        None
    }
}
