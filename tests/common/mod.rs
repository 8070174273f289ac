use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub struct ServerGuard {
    pub base_url: String,
    pub files_root: PathBuf,
    pub beads_root: PathBuf,
    _data_dir: tempfile::TempDir,
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn spawn_server() -> Result<ServerGuard> {
    let data_dir = tempfile::tempdir().context("create server tempdir")?;

    let files_root = data_dir.path().join("files");
    std::fs::create_dir_all(&files_root).context("create files root")?;
    let beads_root = data_dir.path().join("beads");
    std::fs::create_dir_all(&beads_root).context("create beads root")?;

    let addr_file = data_dir.path().join("addr.txt");

    let child = Command::new(env!("CARGO_BIN_EXE_gastown-server"))
        .args([
            "--addr",
            "127.0.0.1:0",
            "--addr-file",
            addr_file.to_str().unwrap(),
            "--roots",
            files_root.to_str().unwrap(),
            "--beads-roots",
            beads_root.to_str().unwrap(),
            "--workdir",
            files_root.to_str().unwrap(),
            // A command that does not exist, so bv-backed routes exercise
            // the BV_NOT_INSTALLED path deterministically.
            "--bv-command",
            "bv-missing-for-tests",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn gastown-server")?;

    let base_url = read_addr_file(&addr_file)?;
    wait_for_health(&base_url)?;

    Ok(ServerGuard {
        base_url,
        files_root,
        beads_root,
        _data_dir: data_dir,
        child,
    })
}

fn read_addr_file(addr_file: &Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_health(base_url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("server did not become healthy at {}/api/health", base_url);
        }
        match client.get(format!("{}/api/health", base_url)).send() {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => thread::sleep(Duration::from_millis(25)),
        }
    }
}

/// URL path for a filesystem location under the file-browser routes: the
/// absolute path minus its leading slash, appended to the route prefix.
pub fn resource_url(base_url: &str, path: &Path) -> String {
    format!(
        "{}/api/files/resources/{}",
        base_url,
        path.to_string_lossy().trim_start_matches('/')
    )
}

pub fn raw_url(base_url: &str, path: &Path) -> String {
    format!(
        "{}/api/files/raw/{}",
        base_url,
        path.to_string_lossy().trim_start_matches('/')
    )
}
