use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, body::Bytes};
use clap::Parser;
use tokio::sync::RwLock;

use gastown::model::{
    AppearanceRequest, NUKE_CONFIRM_HEADER, NUKE_CONFIRM_VALUE, SessionsResponse, TmuxSession,
};
use gastown::sessions::{
    categorize_session, group_sessions, sort_sessions, validate_session_name,
};
use gastown::util::{generated_session_name, now_ts};

#[path = "gastown_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "gastown_server/validators.rs"]
mod validators;
use self::validators::*;
#[path = "gastown_server/handlers_tmux.rs"]
mod handlers_tmux;
use self::handlers_tmux::*;
#[path = "gastown_server/handlers_files.rs"]
mod handlers_files;
use self::handlers_files::*;
#[path = "gastown_server/handlers_beads.rs"]
mod handlers_beads;
use self::handlers_beads::*;
#[path = "gastown_server/routes.rs"]
mod routes;
use self::routes::api_router;

#[derive(Parser)]
#[command(name = "gastown-server")]
#[command(about = "Gas Town dashboard API server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:7717")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Comma-separated roots the file browser may touch
    /// (falls back to GASTOWN_ROOTS, then /code,/vault)
    #[arg(long)]
    roots: Option<String>,

    /// Working directory for new tmux sessions
    /// (falls back to GASTOWN_WORKDIR, then the first allowed root)
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Comma-separated roots beads projects may live under
    /// (falls back to BEADS_ALLOWED_ROOTS, then /code,/workspace)
    #[arg(long)]
    beads_roots: Option<String>,

    /// Beads viewer command (falls back to BV_COMMAND, then `bv`)
    #[arg(long)]
    bv_command: Option<String>,
}

#[derive(Clone)]
struct AppState {
    workdir: PathBuf,

    // File browser allow-list; everything outside rejects with 403.
    allowed_roots: Vec<PathBuf>,

    beads_roots: Vec<PathBuf>,
    beads_default: PathBuf,
    bv_command: String,

    tmux_tmpdir: String,

    sessions_cache: Arc<RwLock<Option<(SessionsResponse, Instant)>>>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let allowed_roots = roots_from(args.roots.as_deref(), "GASTOWN_ROOTS", "/code,/vault");
    let beads_roots = roots_from(
        args.beads_roots.as_deref(),
        "BEADS_ALLOWED_ROOTS",
        "/code,/workspace",
    );

    let workdir = args
        .workdir
        .or_else(|| std::env::var("GASTOWN_WORKDIR").ok().map(PathBuf::from))
        .or_else(|| allowed_roots.first().cloned())
        .unwrap_or_else(|| PathBuf::from("/code"));

    let beads_default = std::env::var("BEADS_PROJECT_PATH")
        .ok()
        .map(PathBuf::from)
        .or_else(|| beads_roots.first().cloned())
        .unwrap_or_else(|| PathBuf::from("/workspace"));

    let bv_command = args
        .bv_command
        .or_else(|| std::env::var("BV_COMMAND").ok())
        .unwrap_or_else(|| "bv".to_string());

    let tmux_tmpdir = match std::env::var("TMUX_TMPDIR") {
        Ok(dir) if !dir.trim().is_empty() => dir.trim().to_string(),
        _ => "/tmp".to_string(),
    };

    let state = Arc::new(AppState {
        workdir,
        allowed_roots,
        beads_roots,
        beads_default,
        bv_command,
        tmux_tmpdir,
        sessions_cache: Arc::new(RwLock::new(None)),
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .merge(api_router())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("gastown-server listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn roots_from(arg: Option<&str>, env_key: &str, fallback: &str) -> Vec<PathBuf> {
    let raw = match arg {
        Some(raw) => raw.to_string(),
        None => std::env::var(env_key).unwrap_or_else(|_| fallback.to_string()),
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": now_ts(),
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
