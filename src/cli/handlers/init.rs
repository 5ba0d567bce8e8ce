use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::project_io;

/// Infer a project name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name for a project file at `path` when none was given
fn default_name(path: &Path) -> String {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_default(),
    };
    let inferred = dir
        .canonicalize()
        .unwrap_or(dir)
        .file_name()
        .and_then(|n| n.to_str())
        .map(infer_name)
        .unwrap_or_default();
    if inferred.is_empty() {
        "Tasks".to_string()
    } else {
        inferred
    }
}

pub fn cmd_init(path: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let name = args.name.unwrap_or_else(|| default_name(path));
    let project = project_io::init_project(path, &name)?;
    println!(
        "Created {} ({}: {} | {})",
        path.display(),
        project.name,
        project.statuses.active.join(", "),
        project.statuses.inactive.join(", ")
    );
    Ok(())
}
