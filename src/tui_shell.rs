//! The dashboard shell: a terminal front end over the dashboard store.
//! Owns the terminal lifecycle; all state transitions go through
//! `DashboardStore` so the shell and the CLI share one behavior.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

mod app;
mod render;

use self::app::App;

pub(crate) fn run(data_dir: &Path, server: &str) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("the dashboard shell requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let app = App::open(data_dir, server);
    let res = match app {
        Ok(mut app) => app::run_loop(&mut terminal, &mut app),
        Err(err) => Err(err),
    };

    disable_raw_mode().ok();
    execute!(io::stdout(), LeaveAlternateScreen).ok();

    res
}
