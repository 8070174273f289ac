mod common;

use anyhow::{Context, Result};

#[test]
fn session_names_are_validated_before_tmux_runs() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    // Bad characters.
    let resp = client
        .post(format!("{}/api/tmux/sessions", guard.base_url))
        .json(&serde_json::json!({ "name": "bad name!" }))
        .send()
        .context("POST bad name")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Too long.
    let resp = client
        .post(format!("{}/api/tmux/sessions", guard.base_url))
        .json(&serde_json::json!({ "name": "x".repeat(51) }))
        .send()
        .context("POST long name")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // Rename validates both ends.
    let resp = client
        .patch(format!("{}/api/tmux/sessions/ok-name", guard.base_url))
        .json(&serde_json::json!({ "newName": "not ok" }))
        .send()
        .context("PATCH bad new name")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let resp = client
        .delete(format!("{}/api/tmux/sessions/bad%20name", guard.base_url))
        .send()
        .context("DELETE bad name")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    Ok(())
}

#[test]
fn nuke_requires_the_confirmation_header() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp = client
        .delete(format!("{}/api/tmux/sessions/all", guard.base_url))
        .send()
        .context("DELETE all without header")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let resp = client
        .delete(format!("{}/api/tmux/sessions/all", guard.base_url))
        .header("x-nuke-confirm", "wrong-value")
        .send()
        .context("DELETE all with wrong header")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

    Ok(())
}

#[test]
fn appearance_rejects_bad_colors_and_tolerates_absent_tmux() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp = client
        .post(format!("{}/api/tmux/appearance", guard.base_url))
        .json(&serde_json::json!({ "statusBg": "rgb(0,0,0)", "statusFg": "#00ff41" }))
        .send()
        .context("POST bad color")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let resp = client
        .post(format!("{}/api/tmux/appearance", guard.base_url))
        .json(&serde_json::json!({ "statusBg": "#zzz" }))
        .send()
        .context("POST bad hex")?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // Valid values succeed even when no tmux server can accept them; the
    // push is best-effort and the handler reports what it managed.
    let resp = client
        .post(format!("{}/api/tmux/appearance", guard.base_url))
        .json(&serde_json::json!({
            "statusBg": "#0a0a1a",
            "statusFg": "green",
            "paneBorderActive": "default",
        }))
        .send()
        .context("POST valid appearance")?;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 2);

    Ok(())
}
