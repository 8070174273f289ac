use std::path::Path;

use anyhow::Result;

pub fn run(data_dir: &Path, server: &str) -> Result<()> {
    crate::tui_shell::run(data_dir, server)
}
