use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `tasksheet=debug`
pub const LOG_ENV: &str = "TASKSHEET_LOG";

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The TUI owns the terminal; write next to the project file
    File,
    Stderr,
}

/// Log file used in TUI mode for a given project file
pub fn log_path(project_path: &Path) -> PathBuf {
    match project_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("tasksheet.log"),
        _ => PathBuf::from("tasksheet.log"),
    }
}

/// Install the global subscriber. Does nothing unless `TASKSHEET_LOG` is set.
pub fn init(target: LogTarget, project_path: &Path) {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return;
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // A second init (or an unwritable log file) just leaves logging off
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let file = match OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path(project_path))
            {
                Ok(file) => file,
                Err(_) => return,
            };
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
}
