use super::*;

use std::fs;
use std::path::PathBuf;

enum Resolved {
    /// The virtual root above the allowed roots.
    Root,
    Path(PathBuf),
}

fn resolve_safe(state: &AppState, raw: &str) -> Result<Resolved, Response> {
    let normalized = normalize_request_path(&format!("/{}", raw));
    if normalized == std::path::Path::new("/") {
        return Ok(Resolved::Root);
    }
    if !path_within_roots(&state.allowed_roots, &normalized) {
        return Err(file_error(StatusCode::FORBIDDEN, "Path not allowed"));
    }
    Ok(Resolved::Path(normalized))
}

fn modified_ts(meta: &fs::Metadata) -> String {
    meta.modified()
        .ok()
        .map(|st| {
            time::OffsetDateTime::from(st)
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default()
        })
        .unwrap_or_default()
}

fn extension_of(path: &std::path::Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

fn roots_listing(state: &AppState) -> serde_json::Value {
    let items: Vec<serde_json::Value> = state
        .allowed_roots
        .iter()
        .map(|root| {
            serde_json::json!({
                "name": root.to_string_lossy().trim_start_matches('/'),
                "size": 0,
                "modified": now_ts(),
                "isDir": true,
                "type": "",
            })
        })
        .collect();
    serde_json::json!({ "isDir": true, "items": items })
}

pub(crate) async fn list_roots(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(roots_listing(&state))
}

pub(crate) async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    let path = match resolve_safe(&state, &raw)? {
        Resolved::Root => return Ok(Json(roots_listing(&state))),
        Resolved::Path(path) => path,
    };

    let meta = fs::metadata(&path).map_err(file_io_error)?;
    if !meta.is_dir() {
        return Ok(Json(serde_json::json!({
            "isDir": false,
            "name": path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            "size": meta.len(),
            "modified": modified_ts(&meta),
            "type": extension_of(&path),
        })));
    }

    let mut items = Vec::new();
    let entries = fs::read_dir(&path).map_err(file_io_error)?;
    for entry in entries {
        // Unreadable entries are skipped, not fatal.
        let Ok(entry) = entry else { continue };
        let Ok(meta) = entry.metadata() else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = meta.is_dir();
        items.push(serde_json::json!({
            "name": name,
            "size": if is_dir { 0 } else { meta.len() },
            "modified": modified_ts(&meta),
            "isDir": is_dir,
            "type": if is_dir { String::new() } else { extension_of(&entry.path()) },
        }));
    }

    Ok(Json(serde_json::json!({ "isDir": true, "items": items })))
}

pub(crate) async fn create_resource(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, Response> {
    let path = match resolve_safe(&state, &raw)? {
        Resolved::Root => {
            return Err(file_error(StatusCode::FORBIDDEN, "Cannot create at root"));
        }
        Resolved::Path(path) => path,
    };

    // A trailing slash on the request means "make a directory".
    if raw.ends_with('/') {
        fs::create_dir_all(&path).map_err(file_io_error)?;
        return Ok(Json(serde_json::json!({ "success": true })));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(file_io_error)?;
    }
    fs::write(&path, &body).map_err(file_io_error)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct RenameRequest {
    #[serde(default)]
    action: String,

    #[serde(default)]
    destination: String,
}

pub(crate) async fn rename_resource(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    let source = match resolve_safe(&state, &raw)? {
        Resolved::Root => return Err(file_error(StatusCode::FORBIDDEN, "Cannot rename root")),
        Resolved::Path(path) => path,
    };

    if payload.action != "rename" || payload.destination.is_empty() {
        return Err(file_error(StatusCode::BAD_REQUEST, "Invalid request"));
    }

    let destination = match resolve_safe(&state, payload.destination.trim_start_matches('/')) {
        Ok(Resolved::Path(path)) => path,
        _ => return Err(file_error(StatusCode::FORBIDDEN, "Invalid destination")),
    };

    fs::rename(&source, &destination).map_err(file_io_error)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub(crate) async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    let path = match resolve_safe(&state, &raw)? {
        Resolved::Root => return Err(file_error(StatusCode::FORBIDDEN, "Cannot delete root")),
        Resolved::Path(path) => path,
    };

    let meta = fs::metadata(&path).map_err(file_io_error)?;
    if meta.is_dir() {
        fs::remove_dir_all(&path).map_err(file_io_error)?;
    } else {
        fs::remove_file(&path).map_err(file_io_error)?;
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

pub(crate) async fn download_resource(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Response, Response> {
    let path = match resolve_safe(&state, &raw)? {
        Resolved::Root => return Err(file_error(StatusCode::FORBIDDEN, "Cannot download root")),
        Resolved::Path(path) => path,
    };

    let meta = fs::metadata(&path).map_err(file_io_error)?;
    if meta.is_dir() {
        return Err(file_error(
            StatusCode::BAD_REQUEST,
            "Cannot download directory",
        ));
    }

    let bytes = fs::read(&path).map_err(file_io_error)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
