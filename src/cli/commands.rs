use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::project_io::DEFAULT_FILE;

#[derive(Parser)]
#[command(
    name = "tasksheet",
    about = concat!("tasksheet v", env!("CARGO_PKG_VERSION"), " - a task grid with undo"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project file to open
    #[arg(short = 'f', long = "file", global = true, default_value = DEFAULT_FILE)]
    pub file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project file
    Init(InitArgs),
    /// Print the tasks of one view
    List(ListArgs),
    /// Apply a JSON-lines script of grid operations, then save
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (default: inferred from the directory name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// List inactive tasks instead of active ones
    #[arg(long)]
    pub inactive: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Script file, one JSON operation per line
    pub script: PathBuf,
}
