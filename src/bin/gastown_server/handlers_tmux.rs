use super::*;

use tokio::process::Command;

const TMUX_TIMEOUT: Duration = Duration::from_secs(5);
const SESSIONS_CACHE_TTL: Duration = Duration::from_secs(1);

/// Failure strings that mean "tmux has no server", which is an empty
/// session list rather than an error.
const NO_SERVER_MARKERS: [&str; 3] = [
    "no server running",
    "No such file or directory",
    "error connecting",
];

async fn run_tmux(state: &AppState, args: &[&str]) -> Result<String> {
    let output = tokio::time::timeout(
        TMUX_TIMEOUT,
        Command::new("tmux")
            .args(args)
            .env("TMUX_TMPDIR", &state.tmux_tmpdir)
            .output(),
    )
    .await
    .map_err(|_| anyhow::anyhow!("tmux timed out after {:?}", TMUX_TIMEOUT))?
    .context("spawn tmux")?;

    if !output.status.success() {
        anyhow::bail!(
            "tmux {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn invalidate_sessions_cache(state: &AppState) {
    let mut cache = state.sessions_cache.write().await;
    *cache = None;
}

pub(crate) async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionsResponse> {
    {
        let cache = state.sessions_cache.read().await;
        if let Some((response, stamp)) = cache.as_ref()
            && stamp.elapsed() < SESSIONS_CACHE_TTL
        {
            return Json(response.clone());
        }
    }

    let mut response = SessionsResponse {
        timestamp: now_ts(),
        ..SessionsResponse::default()
    };

    match run_tmux(
        &state,
        &[
            "list-sessions",
            "-F",
            "#{session_name}:#{session_windows}:#{session_attached}",
        ],
    )
    .await
    {
        Ok(output) => {
            for line in output.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut parts = line.splitn(3, ':');
                let (Some(name), Some(windows), Some(attached)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    continue;
                };
                let windows = match windows.parse::<u32>() {
                    Ok(0) | Err(_) => 1,
                    Ok(n) => n,
                };
                response.sessions.push(TmuxSession {
                    name: name.to_string(),
                    windows,
                    attached: attached == "1",
                    group: categorize_session(name),
                });
            }
            sort_sessions(&mut response.sessions);
            response.grouped = group_sessions(&response.sessions);
        }
        Err(err) => {
            let text = format!("{:#}", err);
            if !NO_SERVER_MARKERS.iter().any(|m| text.contains(m)) {
                response.error = Some(text);
            }
        }
    }

    let mut cache = state.sessions_cache.write().await;
    *cache = Some((response.clone(), Instant::now()));
    Json(response)
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CreateSessionRequest {
    #[serde(default)]
    name: Option<String>,
}

pub(crate) async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<CreateSessionRequest>>,
) -> Result<Json<serde_json::Value>, Response> {
    let requested = payload
        .and_then(|Json(p)| p.name)
        .filter(|name| !name.is_empty());

    let name = match requested {
        Some(name) => {
            validate_session_name(&name, "session name").map_err(bad_request)?;
            name
        }
        None => generated_session_name("shell"),
    };

    let workdir = state.workdir.to_string_lossy().into_owned();
    run_tmux(&state, &["new-session", "-d", "-s", &name, "-c", &workdir])
        .await
        .map_err(|err| tmux_error(StatusCode::BAD_REQUEST, err))?;

    invalidate_sessions_cache(&state).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "session": name,
        "timestamp": now_ts(),
    })))
}

pub(crate) async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    validate_session_name(&name, "session name").map_err(bad_request)?;

    run_tmux(&state, &["kill-session", "-t", &name])
        .await
        .map_err(|err| tmux_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;

    invalidate_sessions_cache(&state).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "killed": name,
        "timestamp": now_ts(),
    })))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameSessionRequest {
    new_name: String,
}

pub(crate) async fn rename_session(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<RenameSessionRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    validate_session_name(&name, "current session name").map_err(bad_request)?;
    validate_session_name(&payload.new_name, "new session name").map_err(bad_request)?;

    run_tmux(&state, &["rename-session", "-t", &name, &payload.new_name])
        .await
        .map_err(|err| tmux_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;

    invalidate_sessions_cache(&state).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "oldName": name,
        "newName": payload.new_name,
        "timestamp": now_ts(),
    })))
}

pub(crate) async fn delete_all_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Response> {
    let confirmed = headers
        .get(NUKE_CONFIRM_HEADER)
        .and_then(|v| v.to_str().ok())
        == Some(NUKE_CONFIRM_VALUE);
    if !confirmed {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "nuke requires dashboard confirmation, use the UI",
        ));
    }

    let names: Vec<String> = match run_tmux(&state, &["list-sessions", "-F", "#{session_name}"])
        .await
    {
        Ok(output) => output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };

    if names.is_empty() {
        return Ok(Json(serde_json::json!({
            "success": true,
            "killed": 0,
            "message": "no sessions to kill",
            "timestamp": now_ts(),
        })));
    }

    run_tmux(&state, &["kill-server"])
        .await
        .map_err(|err| tmux_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;

    invalidate_sessions_cache(&state).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "killed": names.len(),
        "sessions": names,
        "timestamp": now_ts(),
    })))
}

pub(crate) async fn apply_appearance(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AppearanceRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    for (key, value) in payload.fields() {
        if !value.is_empty() && validate_color(value).is_err() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("invalid color for {}: {}", key, value),
            ));
        }
    }

    let mut commands: Vec<Vec<String>> = Vec::new();
    let set = |style: &str, value: String| -> Vec<String> {
        vec![
            "set".to_string(),
            "-g".to_string(),
            style.to_string(),
            value,
        ]
    };
    if !payload.status_bg.is_empty() && !payload.status_fg.is_empty() {
        commands.push(set(
            "status-style",
            format!("bg={},fg={}", payload.status_bg, payload.status_fg),
        ));
    }
    if !payload.pane_border_active.is_empty() {
        commands.push(set(
            "pane-active-border-style",
            format!("fg={}", payload.pane_border_active),
        ));
    }
    if !payload.pane_border_inactive.is_empty() {
        commands.push(set(
            "pane-border-style",
            format!("fg={}", payload.pane_border_inactive),
        ));
    }
    if !payload.mode_style_bg.is_empty() && !payload.mode_style_fg.is_empty() {
        commands.push(set(
            "mode-style",
            format!("bg={},fg={}", payload.mode_style_bg, payload.mode_style_fg),
        ));
    }

    // Style pushes are best-effort; the tmux server may simply not be up.
    let total = commands.len();
    let mut applied = 0;
    for command in &commands {
        let args: Vec<&str> = command.iter().map(String::as_str).collect();
        if run_tmux(&state, &args).await.is_ok() {
            applied += 1;
        }
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "applied": applied,
        "total": total,
        "timestamp": now_ts(),
    })))
}
