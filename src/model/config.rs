use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::task::View;

/// `[project]` table of the project file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    /// Next task id to hand out
    #[serde(default = "default_next_id")]
    pub next_id: u64,
}

/// `[statuses]`: the active and inactive lists partition every known status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            active: vec!["Todo".into(), "Doing".into()],
            inactive: vec!["Done".into()],
        }
    }
}

impl StatusConfig {
    /// Which view a status belongs to, None for unknown labels
    pub fn classify(&self, status: &str) -> Option<View> {
        if self.active.iter().any(|s| s == status) {
            Some(View::Active)
        } else if self.inactive.iter().any(|s| s == status) {
            Some(View::Inactive)
        } else {
            None
        }
    }

    pub fn for_view(&self, view: View) -> &[String] {
        match view {
            View::Active => &self.active,
            View::Inactive => &self.inactive,
        }
    }

    /// Status given to tasks created in `view`
    pub fn default_for(&self, view: View) -> Option<&str> {
        self.for_view(view).first().map(String::as_str)
    }

    /// Every status, active ones first
    pub fn all(&self) -> Vec<String> {
        self.active.iter().chain(self.inactive.iter()).cloned().collect()
    }
}

/// `[categories]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        CategoryConfig {
            labels: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Show the id column
    #[serde(default)]
    pub show_task_ids: bool,
    /// Theme overrides, e.g. `highlight = "#FB4196"`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Default: 500
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            limit: default_history_limit(),
        }
    }
}

fn default_next_id() -> u64 {
    1
}

fn default_history_limit() -> usize {
    500
}
