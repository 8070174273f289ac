use super::*;

/// Typed error envelope used by the tmux and beads APIs:
/// `{"success": false, "error": {"code", "message"}, "timestamp"}`.
pub(crate) fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": { "code": code, "message": message.into() },
            "timestamp": now_ts(),
        })),
    )
        .into_response()
}

pub(crate) fn bad_request(err: anyhow::Error) -> Response {
    api_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", format!("{:#}", err))
}

pub(crate) fn tmux_error(status: StatusCode, err: anyhow::Error) -> Response {
    api_error(status, "TMUX_ERROR", format!("{:#}", err))
}

/// Flat `{"error": "..."}` body used by the file browser routes.
pub(crate) fn file_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

pub(crate) fn file_not_found() -> Response {
    file_error(StatusCode::NOT_FOUND, "Not found")
}

pub(crate) fn file_io_error(err: std::io::Error) -> Response {
    if err.kind() == std::io::ErrorKind::NotFound {
        return file_not_found();
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

pub(crate) fn beads_ok(data: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": data,
        "timestamp": now_ts(),
    }))
}

pub(crate) fn beads_error(code: &str, message: impl Into<String>) -> Response {
    api_error(beads_status_for(code), code, message)
}

fn beads_status_for(code: &str) -> StatusCode {
    match code {
        "BAD_REQUEST" => StatusCode::BAD_REQUEST,
        "FORBIDDEN" => StatusCode::FORBIDDEN,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "VALIDATION" => StatusCode::UNPROCESSABLE_ENTITY,
        "BV_ERROR" | "INVALID_JSON" => StatusCode::BAD_GATEWAY,
        "BV_NOT_INSTALLED" => StatusCode::SERVICE_UNAVAILABLE,
        "TIMEOUT" => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
