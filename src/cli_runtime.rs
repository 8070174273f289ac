use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::Commands;

#[derive(Parser)]
#[command(name = "gastown")]
#[command(about = "Gas Town arena dashboard", long_about = None)]
pub(crate) struct Cli {
    /// Dashboard API server base URL
    #[arg(long, default_value = gastown::remote::DEFAULT_SERVER)]
    pub(crate) server: String,

    /// Local dashboard state directory (falls back to GASTOWN_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

pub(crate) fn data_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    cli_dir
        .or_else(|| std::env::var("GASTOWN_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./gastown-data"))
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let dir = data_dir(cli.data_dir);

    match cli.command {
        // Bare `gastown` is the dashboard shell.
        None => gastown::tui::run(&dir, &cli.server),
        Some(command) => crate::cli_exec::handle_command(&dir, &cli.server, command),
    }
}
