use serde::Deserialize;
use tracing::debug;

use crate::grid::controller::{GridController, GridError};
use crate::model::task::View;

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptStep {
    Add {
        view: View,
        row: usize,
    },
    Delete {
        view: View,
        row: usize,
    },
    Move {
        view: View,
        from: usize,
        to: usize,
    },
    Text {
        view: View,
        row: usize,
        text: String,
        /// Defaults to the end of the text
        #[serde(default)]
        caret: Option<usize>,
    },
    Status {
        view: View,
        row: usize,
        status: String,
        /// Defaults to the view the status belongs to
        #[serde(default)]
        final_view: Option<View>,
        /// Defaults to row 1 after a crossing, else the same row
        #[serde(default)]
        final_row: Option<usize>,
    },
    Category {
        view: View,
        row: usize,
        category: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: {source}")]
    Step { line: usize, source: GridError },
}

/// Parse a JSON-lines script into `(line number, step)` pairs. Blank lines
/// and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<(usize, ScriptStep)>, ScriptError> {
    let mut steps = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(line)
            .map_err(|source| ScriptError::Parse { line: i + 1, source })?;
        steps.push((i + 1, step));
    }
    Ok(steps)
}

/// Apply one step through the grid's manual API
pub fn apply_step(grid: &mut GridController, step: &ScriptStep) -> Result<(), GridError> {
    match step {
        ScriptStep::Add { view, row } => grid.manual_add_task(*view, *row, None),
        ScriptStep::Delete { view, row } => grid.manual_delete_task(*view, *row),
        ScriptStep::Move { view, from, to } => grid.manual_move_task(*view, *from, *to),
        ScriptStep::Text {
            view,
            row,
            text,
            caret,
        } => grid.manual_text_change(*view, *row, text, caret.unwrap_or(text.len()), 0),
        ScriptStep::Status {
            view,
            row,
            status,
            final_view,
            final_row,
        } => {
            let target = grid.project().statuses.classify(status).unwrap_or(*view);
            let final_view = final_view.unwrap_or(target);
            let final_row = final_row.unwrap_or(if target == *view { *row } else { 1 });
            grid.manual_change_task_status(*view, *row, final_view, final_row, status, None)
        }
        ScriptStep::Category {
            view,
            row,
            category,
        } => grid.manual_change_task_category(*view, *row, category),
    }
}

/// Parse and apply a whole script. Stops at the first failing step.
/// Returns the number of steps applied.
pub fn run_script(grid: &mut GridController, text: &str) -> Result<usize, ScriptError> {
    let steps = parse_script(text)?;
    for (line, step) in &steps {
        debug!(line, ?step, "replaying");
        apply_step(grid, step).map_err(|source| ScriptError::Step { line: *line, source })?;
    }
    Ok(steps.len())
}
