use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date format used for the created/finished columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which partition of the task collection a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Active,
    Inactive,
}

impl View {
    /// The opposite partition
    pub fn other(self) -> View {
        match self {
            View::Active => View::Inactive,
            View::Inactive => View::Active,
        }
    }

    pub fn is_active(self) -> bool {
        self == View::Active
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Active => "Active",
            View::Inactive => "Inactive",
        }
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identity, never reused within a project
    pub id: u64,
    /// Free text shown in the title column
    pub description: String,
    /// Status label from the project's status vocabulary
    pub status: String,
    /// Category label (empty = none)
    #[serde(default)]
    pub category: String,
    pub created: NaiveDateTime,
    /// Set iff the status is classified inactive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(id: u64, status: String, category: String, created: NaiveDateTime) -> Self {
        Task {
            id,
            description: String::new(),
            status,
            category,
            created,
            completed: None,
        }
    }

    pub fn created_text(&self) -> String {
        self.created.format(DATE_FORMAT).to_string()
    }

    /// Finished date for display, empty while the task is still active
    pub fn completed_text(&self) -> String {
        self.completed
            .map(|c| c.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn view_other_flips() {
        assert_eq!(View::Active.other(), View::Inactive);
        assert_eq!(View::Inactive.other(), View::Active);
    }

    #[test]
    fn date_texts() {
        let mut task = Task::new(1, "Todo".into(), String::new(), at(4));
        assert_eq!(task.created_text(), "2026-03-04");
        assert_eq!(task.completed_text(), "");
        task.completed = Some(at(9));
        assert_eq!(task.completed_text(), "2026-03-09");
    }

    #[test]
    fn view_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&View::Inactive).unwrap(), "\"inactive\"");
    }
}
