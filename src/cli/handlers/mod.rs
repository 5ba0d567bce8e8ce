mod init;
pub use init::cmd_init;

use std::path::Path;

use tracing::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::grid::controller::GridController;
use crate::io::project_io;
use crate::io::script;
use crate::logging::{self, LogTarget};
use crate::model::task::View;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogTarget::Stderr, &cli.file);
    match cli.command {
        // No subcommand is the TUI, started from main
        None => Ok(()),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(&cli.file, args),
            Commands::List(args) => cmd_list(&cli.file, args),
            Commands::Replay(args) => cmd_replay(&cli.file, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(path: &Path, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_io::load_project(path)?;
    let view = if args.inactive {
        View::Inactive
    } else {
        View::Active
    };
    let tasks = project.tasks(view);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&task_list_to_json(view, tasks))?
        );
    } else {
        for (i, task) in tasks.iter().enumerate() {
            println!("{}", format_task_line(i + 1, task));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_replay(path: &Path, args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("cannot read script '{}': {}", args.script.display(), e))?;
    let mut grid = GridController::new(project_io::load_project(path)?);
    let applied = script::run_script(&mut grid, &text)?;
    grid.save()?;
    info!(applied, script = %args.script.display(), "replay finished");
    println!("applied {} operations", applied);
    Ok(())
}
