use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model::config::{CategoryConfig, HistoryConfig, ProjectInfo, StatusConfig, UiConfig};
use crate::model::project::Project;
use crate::model::task::{Task, View};

/// Default project file name
pub const DEFAULT_FILE: &str = "tasks.toml";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("no project file at {0} (run `tasksheet init` first)")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse project file: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize project file: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("invalid project file: {0}")]
    Invalid(String),
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// On-disk layout of a project file. Task arrays go last so they follow
/// the settings tables.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    project: ProjectInfo,
    #[serde(default)]
    statuses: StatusConfig,
    #[serde(default)]
    categories: CategoryConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(default)]
    history: HistoryConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    active: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    inactive: Vec<Task>,
}

/// Load and validate a project file.
pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    if !path.exists() {
        return Err(ProjectError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let project = parse_project(&text, path)?;
    info!(
        path = %path.display(),
        active = project.active.len(),
        inactive = project.inactive.len(),
        "project loaded"
    );
    Ok(project)
}

/// Parse project text. `path` is recorded on the result, not read.
pub fn parse_project(text: &str, path: &Path) -> Result<Project, ProjectError> {
    let mut file: ProjectFile = toml::from_str(text)?;
    validate(&mut file)?;
    Ok(Project {
        path: path.to_path_buf(),
        name: file.project.name,
        next_id: file.project.next_id,
        statuses: file.statuses,
        categories: file.categories,
        ui: file.ui,
        history: file.history,
        active: file.active,
        inactive: file.inactive,
        dirty: false,
        disk_text: Some(text.to_string()),
    })
}

fn validate(file: &mut ProjectFile) -> Result<(), ProjectError> {
    let statuses = &file.statuses;
    if statuses.active.is_empty() || statuses.inactive.is_empty() {
        return Err(ProjectError::Invalid(
            "[statuses] needs at least one active and one inactive status".into(),
        ));
    }
    let mut seen = HashSet::new();
    for label in statuses.active.iter().chain(statuses.inactive.iter()) {
        if !seen.insert(label.as_str()) {
            return Err(ProjectError::Invalid(format!(
                "status '{}' is listed more than once",
                label
            )));
        }
    }

    let mut ids = HashSet::new();
    let mut max_id = 0;
    for view in [View::Active, View::Inactive] {
        let tasks = match view {
            View::Active => &file.active,
            View::Inactive => &file.inactive,
        };
        for task in tasks {
            match statuses.classify(&task.status) {
                Some(v) if v == view => {}
                Some(_) => {
                    return Err(ProjectError::Invalid(format!(
                        "task {} with status '{}' is listed under [[{}]]",
                        task.id,
                        task.status,
                        view.label().to_lowercase()
                    )));
                }
                None => {
                    return Err(ProjectError::Invalid(format!(
                        "task {} has unknown status '{}'",
                        task.id, task.status
                    )));
                }
            }
            if task.completed.is_some() != (view == View::Inactive) {
                return Err(ProjectError::Invalid(format!(
                    "task {} has a completion date inconsistent with its status",
                    task.id
                )));
            }
            if !file.categories.labels.contains(&task.category) {
                return Err(ProjectError::Invalid(format!(
                    "task {} has unknown category '{}'",
                    task.id, task.category
                )));
            }
            if !ids.insert(task.id) {
                return Err(ProjectError::Invalid(format!("duplicate task id {}", task.id)));
            }
            max_id = max_id.max(task.id);
        }
    }

    if file.project.next_id <= max_id {
        debug!(next_id = file.project.next_id, max_id, "raising next_id");
        file.project.next_id = max_id + 1;
    }
    Ok(())
}

/// Serialize a project to its file text
pub fn serialize_project(project: &Project) -> Result<String, ProjectError> {
    let file = ProjectFile {
        project: ProjectInfo {
            name: project.name.clone(),
            next_id: project.next_id,
        },
        statuses: project.statuses.clone(),
        categories: project.categories.clone(),
        ui: project.ui.clone(),
        history: project.history.clone(),
        active: project.active.clone(),
        inactive: project.inactive.clone(),
    };
    Ok(toml::to_string(&file)?)
}

/// Write the project atomically and remember the text written.
pub fn save_project(project: &mut Project) -> Result<(), ProjectError> {
    let text = serialize_project(project)?;
    atomic_write(&project.path, text.as_bytes())?;
    project.disk_text = Some(text);
    project.dirty = false;
    info!(path = %project.path.display(), "project saved");
    Ok(())
}

/// True when the file no longer holds what this process last read or wrote
pub fn edited_by_outside_source(project: &Project) -> bool {
    match (fs::read_to_string(&project.path), &project.disk_text) {
        (Ok(text), Some(known)) => text != *known,
        (Ok(_), None) => true,
        (Err(_), Some(_)) => true,
        (Err(_), None) => false,
    }
}

/// Replace `project` with the current file contents
pub fn reload_project(project: &mut Project) -> Result<(), ProjectError> {
    *project = load_project(&project.path)?;
    Ok(())
}

/// Create a project file with default vocabularies. Never overwrites.
pub fn init_project(path: &Path, name: &str) -> Result<Project, ProjectError> {
    if path.exists() {
        return Err(ProjectError::AlreadyExists(path.to_path_buf()));
    }
    let mut project = Project::new(name, path.to_path_buf());
    save_project(&mut project)?;
    Ok(project)
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[project]
name = "Home"
next_id = 3

[statuses]
active = ["Todo", "Doing"]
inactive = ["Done"]

[categories]
labels = ["", "Errands"]

[[active]]
id = 1
description = "Buy milk"
status = "Todo"
category = "Errands"
created = "2026-10-16T09:00:00"

[[inactive]]
id = 2
description = "Call plumber"
status = "Done"
created = "2026-10-15T09:00:00"
completed = "2026-10-16T10:00:00"
"#;

    fn write_sample(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join(DEFAULT_FILE);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_project() {
        let tmp = TempDir::new().unwrap();
        let path = write_sample(tmp.path(), SAMPLE);
        let project = load_project(&path).unwrap();
        assert_eq!(project.name, "Home");
        assert_eq!(project.next_id, 3);
        assert_eq!(project.active.len(), 1);
        assert_eq!(project.active[0].category, "Errands");
        assert_eq!(
            project.inactive[0].completed,
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap().and_hms_opt(10, 0, 0)
        );
        assert!(project.display_categories());
        assert!(!project.ui.show_task_ids);
        assert_eq!(project.history.limit, 500);
        assert!(!project.dirty);
        assert!(!edited_by_outside_source(&project));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_project(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }

    #[test]
    fn test_save_and_reload_keeps_tasks() {
        let tmp = TempDir::new().unwrap();
        let path = write_sample(tmp.path(), SAMPLE);
        let mut project = load_project(&path).unwrap();
        project.active[0].description = "Buy oat milk".into();
        project.dirty = true;
        save_project(&mut project).unwrap();
        assert!(!project.dirty);
        assert!(!edited_by_outside_source(&project));

        let reloaded = load_project(&path).unwrap();
        assert_eq!(reloaded.active, project.active);
        assert_eq!(reloaded.inactive, project.inactive);
        assert_eq!(reloaded.next_id, 3);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_FILE);
        let project = init_project(&path, "Chores").unwrap();
        assert_eq!(project.statuses, StatusConfig::default());
        assert_eq!(project.categories.labels, vec![String::new()]);

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.name, "Chores");
        assert!(loaded.active.is_empty());

        assert!(matches!(
            init_project(&path, "Again"),
            Err(ProjectError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_outside_edit_detected() {
        let tmp = TempDir::new().unwrap();
        let path = write_sample(tmp.path(), SAMPLE);
        let mut project = load_project(&path).unwrap();
        fs::write(&path, SAMPLE.replace("Buy milk", "Buy bread")).unwrap();
        assert!(edited_by_outside_source(&project));

        reload_project(&mut project).unwrap();
        assert_eq!(project.active[0].description, "Buy bread");
        assert!(!edited_by_outside_source(&project));

        fs::remove_file(&path).unwrap();
        assert!(edited_by_outside_source(&project));
    }

    #[test]
    fn test_low_next_id_is_raised() {
        let tmp = TempDir::new().unwrap();
        let path = write_sample(tmp.path(), &SAMPLE.replace("next_id = 3", "next_id = 1"));
        let project = load_project(&path).unwrap();
        assert_eq!(project.next_id, 3);
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            SAMPLE.replace("inactive = [\"Done\"]", "inactive = [\"Todo\"]"),
            SAMPLE.replace("id = 2", "id = 1"),
            SAMPLE.replace("status = \"Done\"", "status = \"Doing\""),
            SAMPLE.replace("status = \"Todo\"", "status = \"Someday\""),
            SAMPLE.replace("completed = \"2026-10-16T10:00:00\"", ""),
            SAMPLE.replace("category = \"Errands\"", "category = \"Garden\""),
        ];
        for text in cases {
            let err = parse_project(&text, Path::new(DEFAULT_FILE)).unwrap_err();
            assert!(matches!(err, ProjectError::Invalid(_)), "{}", err);
        }
    }

    #[test]
    fn test_parse_error() {
        let err = parse_project("[project", Path::new(DEFAULT_FILE)).unwrap_err();
        assert!(matches!(err, ProjectError::ConfigParseError(_)));
    }

    #[test]
    fn test_serialized_layout() {
        let project = parse_project(SAMPLE, Path::new(DEFAULT_FILE)).unwrap();
        let text = serialize_project(&project).unwrap();
        assert!(text.starts_with("[project]"));
        assert!(text.contains("[[active]]"));
        assert!(text.contains("completed = \"2026-10-16T10:00:00\""));
        let project_pos = text.find("[history]").unwrap();
        assert!(project_pos < text.find("[[active]]").unwrap());
    }
}
