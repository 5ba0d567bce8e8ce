use clap::Parser;
use tasksheet::cli::commands::Cli;
use tasksheet::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = if cli.command.is_none() {
        // No subcommand → launch TUI
        tasksheet::tui::run(&cli.file)
    } else {
        handlers::dispatch(cli)
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
