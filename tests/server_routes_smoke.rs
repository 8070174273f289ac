mod common;

use anyhow::{Context, Result};

#[test]
fn server_route_registration_smoke() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let health = client
        .get(format!("{}/api/health", guard.base_url))
        .send()
        .context("GET /api/health")?;
    assert!(health.status().is_success());
    let body: serde_json::Value = health.json()?;
    assert_eq!(body["status"], "ok");

    // The session listing always answers 200 with the response shape, even
    // with no tmux server (or no tmux at all) on the machine.
    let sessions = client
        .get(format!("{}/api/tmux/sessions", guard.base_url))
        .send()
        .context("GET /api/tmux/sessions")?;
    assert!(sessions.status().is_success());
    let body: serde_json::Value = sessions.json()?;
    assert!(body["sessions"].is_array());
    assert!(body["grouped"].is_object());
    assert!(body["timestamp"].is_string());

    let beads_health = client
        .get(format!("{}/api/beads/health", guard.base_url))
        .send()
        .context("GET /api/beads/health")?;
    assert!(beads_health.status().is_success());
    let body: serde_json::Value = beads_health.json()?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    // Unknown routes still 404 through the composed router.
    let missing = client
        .get(format!("{}/definitely-not-a-route", guard.base_url))
        .send()
        .context("GET unknown route")?;
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    Ok(())
}
