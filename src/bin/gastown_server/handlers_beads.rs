use super::*;

use std::fs;
use std::path::PathBuf;

use tokio::process::Command;

const BV_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProjectQuery {
    #[serde(default)]
    path: Option<String>,
}

/// Resolves the requested project path against the beads allow-list. The
/// path must exist; everything outside the roots is forbidden.
fn project_path(state: &AppState, query: &ProjectQuery) -> Result<PathBuf, Response> {
    let requested = query
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(normalize_request_path)
        .unwrap_or_else(|| state.beads_default.clone());

    if !path_within_roots(&state.beads_roots, &requested) {
        return Err(beads_error(
            "FORBIDDEN",
            format!(
                "project path not in allowed roots: {}",
                requested.display()
            ),
        ));
    }
    if !requested.exists() {
        return Err(beads_error(
            "NOT_FOUND",
            format!("project path does not exist: {}", requested.display()),
        ));
    }
    Ok(requested)
}

fn beads_dir(project: &std::path::Path) -> Result<PathBuf, Response> {
    let dir = project.join(".beads");
    if !dir.is_dir() {
        return Err(beads_error(
            "NOT_FOUND",
            format!("no .beads directory found in {}", project.display()),
        ));
    }
    Ok(dir)
}

async fn run_bv(
    state: &AppState,
    flag: &str,
    project: &std::path::Path,
) -> Result<serde_json::Value, Response> {
    let output = match tokio::time::timeout(
        BV_TIMEOUT,
        Command::new(&state.bv_command)
            .arg(flag)
            .arg(project)
            .output(),
    )
    .await
    {
        Err(_) => {
            return Err(beads_error(
                "TIMEOUT",
                format!("{} {} timed out after {:?}", state.bv_command, flag, BV_TIMEOUT),
            ));
        }
        Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(beads_error(
                "BV_NOT_INSTALLED",
                format!("{} is not installed", state.bv_command),
            ));
        }
        Ok(Err(err)) => return Err(beads_error("BV_ERROR", err.to_string())),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        return Err(beads_error(
            "BV_ERROR",
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|_| beads_error("INVALID_JSON", format!("{} produced non-JSON output", state.bv_command)))
}

pub(crate) async fn beads_health() -> Json<serde_json::Value> {
    beads_ok(serde_json::json!({ "status": "ok" }))
}

pub(crate) async fn beads_issues(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let project = project_path(&state, &query)?;
    let dir = beads_dir(&project)?;

    let issues_file = dir.join("issues.jsonl");
    let content = fs::read_to_string(&issues_file).map_err(|_| {
        beads_error(
            "NOT_FOUND",
            format!("no issues.jsonl file found in {}", dir.display()),
        )
    })?;

    // One issue per line; broken lines are dropped rather than failing the
    // whole listing.
    let issues: Vec<serde_json::Value> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let total = issues.len();

    Ok(beads_ok(serde_json::json!({
        "issues": issues,
        "totalCount": total,
        "projectPath": project.to_string_lossy(),
    })))
}

pub(crate) async fn beads_triage(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let project = project_path(&state, &query)?;
    beads_dir(&project)?;
    let data = run_bv(&state, "--robot-triage", &project).await?;
    Ok(beads_ok(data))
}

pub(crate) async fn beads_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let project = project_path(&state, &query)?;
    beads_dir(&project)?;
    let data = run_bv(&state, "--robot-insights", &project).await?;
    Ok(beads_ok(data))
}

pub(crate) async fn beads_plan(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    let project = project_path(&state, &query)?;
    beads_dir(&project)?;
    let data = run_bv(&state, "--robot-plan", &project).await?;
    Ok(beads_ok(data))
}

/// One-level scan of the beads roots for directories holding `.beads/`.
pub(crate) async fn beads_projects(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let mut projects = Vec::new();
    for root in &state.beads_roots {
        if root.join(".beads").is_dir() {
            projects.push(serde_json::json!({
                "name": root.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
                "path": root.to_string_lossy(),
            }));
        }
        let Ok(entries) = fs::read_dir(root) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && path.join(".beads").is_dir() {
                projects.push(serde_json::json!({
                    "name": entry.file_name().to_string_lossy(),
                    "path": path.to_string_lossy(),
                }));
            }
        }
    }
    beads_ok(serde_json::json!({ "projects": projects }))
}
