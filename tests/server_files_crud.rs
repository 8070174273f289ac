mod common;

use anyhow::{Context, Result};

#[test]
fn file_crud_round_trip() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let file_path = guard.files_root.join("notes/hello.txt");

    // Upload (parents are created).
    let resp = client
        .post(common::resource_url(&guard.base_url, &file_path))
        .body("hello from the arena")
        .send()
        .context("POST file")?;
    assert!(resp.status().is_success());

    // Directory listing shows it.
    let resp = client
        .get(common::resource_url(
            &guard.base_url,
            &guard.files_root.join("notes"),
        ))
        .send()
        .context("GET dir listing")?;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["isDir"], true);
    let items = body["items"].as_array().context("items array")?;
    assert!(items.iter().any(|i| i["name"] == "hello.txt"));

    // File info.
    let resp = client
        .get(common::resource_url(&guard.base_url, &file_path))
        .send()
        .context("GET file info")?;
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["isDir"], false);
    assert_eq!(body["name"], "hello.txt");
    assert_eq!(body["type"], "txt");
    assert_eq!(body["size"], 20);

    // Raw download returns the bytes.
    let resp = client
        .get(common::raw_url(&guard.base_url, &file_path))
        .send()
        .context("GET raw")?;
    assert!(resp.status().is_success());
    assert_eq!(resp.text()?, "hello from the arena");

    // Rename.
    let renamed = guard.files_root.join("notes/renamed.txt");
    let resp = client
        .patch(common::resource_url(&guard.base_url, &file_path))
        .json(&serde_json::json!({
            "action": "rename",
            "destination": renamed.to_string_lossy(),
        }))
        .send()
        .context("PATCH rename")?;
    assert!(resp.status().is_success());

    let resp = client
        .get(common::resource_url(&guard.base_url, &file_path))
        .send()?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let resp = client
        .get(common::resource_url(&guard.base_url, &renamed))
        .send()?;
    assert!(resp.status().is_success());

    // Delete the whole directory.
    let resp = client
        .delete(common::resource_url(
            &guard.base_url,
            &guard.files_root.join("notes"),
        ))
        .send()
        .context("DELETE dir")?;
    assert!(resp.status().is_success());
    assert!(!guard.files_root.join("notes").exists());

    Ok(())
}

#[test]
fn trailing_slash_creates_a_directory() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let dir = guard.files_root.join("made-dir");
    let resp = client
        .post(format!(
            "{}/",
            common::resource_url(&guard.base_url, &dir)
        ))
        .send()
        .context("POST dir")?;
    assert!(resp.status().is_success());
    assert!(dir.is_dir());

    Ok(())
}

#[test]
fn paths_outside_the_roots_are_forbidden() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    // Absolute path outside the allow-list.
    let resp = client
        .get(format!("{}/api/files/resources/etc/passwd", guard.base_url))
        .send()
        .context("GET outside root")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"], "Path not allowed");

    // Traversal out of an allowed root resolves lexically, then rejects.
    let escape = format!(
        "{}/api/files/resources/{}/../../../../etc/passwd",
        guard.base_url,
        guard.files_root.to_string_lossy().trim_start_matches('/')
    );
    let resp = client.get(escape).send().context("GET traversal")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

    // Renaming to a destination outside the roots is rejected too.
    let inside = guard.files_root.join("victim.txt");
    std::fs::write(&inside, "data")?;
    let resp = client
        .patch(common::resource_url(&guard.base_url, &inside))
        .json(&serde_json::json!({
            "action": "rename",
            "destination": "/tmp/escaped.txt",
        }))
        .send()
        .context("PATCH rename outside")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    assert!(inside.exists());

    Ok(())
}

#[test]
fn the_virtual_root_lists_allowed_roots_and_is_immutable() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp = client
        .get(format!("{}/api/files/resources/", guard.base_url))
        .send()
        .context("GET root listing")?;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["isDir"], true);
    let items = body["items"].as_array().context("items")?;
    assert_eq!(items.len(), 1);

    let resp = client
        .get(format!("{}/api/files/resources", guard.base_url))
        .send()
        .context("GET root listing without slash")?;
    assert!(resp.status().is_success());

    let resp = client
        .delete(format!("{}/api/files/resources/..", guard.base_url))
        .send()
        .context("DELETE virtual root")?;
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

    Ok(())
}

#[test]
fn missing_files_are_404() -> Result<()> {
    let guard = common::spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp = client
        .get(common::resource_url(
            &guard.base_url,
            &guard.files_root.join("nope.txt"),
        ))
        .send()
        .context("GET missing")?;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json()?;
    assert_eq!(body["error"], "Not found");

    Ok(())
}
