mod common;

use anyhow::{Context, Result};

fn make_project(guard: &common::ServerGuard, name: &str) -> std::path::PathBuf {
    let project = guard.beads_root.join(name);
    std::fs::create_dir_all(project.join(".beads")).expect("create .beads");
    project
}

#[test]
fn issues_are_parsed_line_wise_with_bad_lines_dropped() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let project = make_project(&guard, "rig-gastown");
    std::fs::write(
        project.join(".beads/issues.jsonl"),
        concat!(
            "{\"id\":\"gt-1\",\"status\":\"open\",\"priority\":1}\n",
            "this line is not json\n",
            "{\"id\":\"gt-2\",\"status\":\"blocked\",\"priority\":3}\n",
        ),
    )?;

    let resp = client
        .get(format!(
            "{}/api/beads/issues?path={}",
            guard.base_url,
            project.to_string_lossy()
        ))
        .send()
        .context("GET issues")?;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalCount"], 2);
    assert_eq!(body["data"]["issues"][0]["id"], "gt-1");

    Ok(())
}

#[test]
fn typed_error_envelope_codes_map_to_statuses() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    // Outside the allow-list: 403 FORBIDDEN.
    let resp = client
        .get(format!("{}/api/beads/issues?path=/etc", guard.base_url))
        .send()
        .context("GET outside roots")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    // Inside but absent: 404 NOT_FOUND.
    let missing = guard.beads_root.join("no-such-project");
    let resp = client
        .get(format!(
            "{}/api/beads/issues?path={}",
            guard.base_url,
            missing.to_string_lossy()
        ))
        .send()
        .context("GET missing project")?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Present but without beads data: 404 as well.
    let bare = guard.beads_root.join("bare");
    std::fs::create_dir_all(&bare)?;
    let resp = client
        .get(format!(
            "{}/api/beads/issues?path={}",
            guard.base_url,
            bare.to_string_lossy()
        ))
        .send()
        .context("GET project without .beads")?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    Ok(())
}

#[test]
fn missing_bv_binary_is_service_unavailable() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    // The test server is configured with a bv command that does not exist.
    let project = make_project(&guard, "rig-bartertown");
    for endpoint in ["triage", "insights", "plan"] {
        let resp = client
            .get(format!(
                "{}/api/beads/{}?path={}",
                guard.base_url,
                endpoint,
                project.to_string_lossy()
            ))
            .send()
            .with_context(|| format!("GET {}", endpoint))?;
        assert_eq!(
            resp.status(),
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "endpoint {}",
            endpoint
        );
        let body: serde_json::Value = resp.json()?;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BV_NOT_INSTALLED");
    }

    Ok(())
}

#[test]
fn projects_scan_finds_beads_directories() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    make_project(&guard, "rig-a");
    make_project(&guard, "rig-b");
    std::fs::create_dir_all(guard.beads_root.join("not-a-project"))?;

    let resp = client
        .get(format!("{}/api/beads/projects", guard.base_url))
        .send()
        .context("GET projects")?;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json()?;
    let projects = body["data"]["projects"].as_array().context("projects")?;
    let names: Vec<&str> = projects
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert!(names.contains(&"rig-a"));
    assert!(names.contains(&"rig-b"));
    assert!(!names.contains(&"not-a-project"));

    Ok(())
}
