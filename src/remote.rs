//! Blocking HTTP client for the gastown server API, used by the CLI, the
//! TUI shell, and the session poller.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::model::{
    AppearanceRequest, NUKE_CONFIRM_HEADER, NUKE_CONFIRM_VALUE, SessionsResponse,
};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:7717";

#[derive(Clone)]
pub struct RemoteClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("gastown")
            .build()
            .context("build reqwest client")?;
        Ok(RemoteClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn health(&self) -> Result<()> {
        let resp = self
            .client
            .get(self.url("/api/health"))
            .send()
            .context("GET /api/health")?;
        if !resp.status().is_success() {
            anyhow::bail!("server unhealthy ({})", resp.status());
        }
        Ok(())
    }

    pub fn list_sessions(&self) -> Result<SessionsResponse> {
        let resp = self
            .client
            .get(self.url("/api/tmux/sessions"))
            .send()
            .context("GET /api/tmux/sessions")?;
        let resp = check(resp)?;
        resp.json().context("parse sessions response")
    }

    /// Creates a session, server-named when `name` is empty. Returns the
    /// session name actually created.
    pub fn create_session(&self, name: Option<&str>) -> Result<String> {
        let body = match name {
            Some(name) => serde_json::json!({ "name": name }),
            None => serde_json::json!({}),
        };
        let resp = self
            .client
            .post(self.url("/api/tmux/sessions"))
            .json(&body)
            .send()
            .context("POST /api/tmux/sessions")?;
        let value: Value = check(resp)?.json().context("parse create response")?;
        value
            .get("session")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("create response missing session name"))
    }

    pub fn rename_session(&self, old: &str, new: &str) -> Result<()> {
        let resp = self
            .client
            .patch(self.url(&format!("/api/tmux/sessions/{}", old)))
            .json(&serde_json::json!({ "newName": new }))
            .send()
            .with_context(|| format!("PATCH /api/tmux/sessions/{}", old))?;
        check(resp)?;
        Ok(())
    }

    pub fn kill_session(&self, name: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/tmux/sessions/{}", name)))
            .send()
            .with_context(|| format!("DELETE /api/tmux/sessions/{}", name))?;
        check(resp)?;
        Ok(())
    }

    /// Kills every session. Returns how many the server reported killed.
    pub fn nuke_sessions(&self) -> Result<u64> {
        let resp = self
            .client
            .delete(self.url("/api/tmux/sessions/all"))
            .header(NUKE_CONFIRM_HEADER, NUKE_CONFIRM_VALUE)
            .send()
            .context("DELETE /api/tmux/sessions/all")?;
        let value: Value = check(resp)?.json().context("parse nuke response")?;
        Ok(value.get("killed").and_then(Value::as_u64).unwrap_or(0))
    }

    /// Pushes tmux appearance styles. Returns (applied, total).
    pub fn apply_appearance(&self, request: &AppearanceRequest) -> Result<(u64, u64)> {
        let resp = self
            .client
            .post(self.url("/api/tmux/appearance"))
            .json(request)
            .send()
            .context("POST /api/tmux/appearance")?;
        let value: Value = check(resp)?.json().context("parse appearance response")?;
        Ok((
            value.get("applied").and_then(Value::as_u64).unwrap_or(0),
            value.get("total").and_then(Value::as_u64).unwrap_or(0),
        ))
    }
}

fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().unwrap_or(Value::Null);
    anyhow::bail!("server returned {}: {}", status, error_message(&body));
}

/// Digs the human-readable message out of either error envelope shape:
/// `{"error": "..."}` or `{"error": {"code": ..., "message": ...}}`.
fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        _ => "unknown error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_handles_both_envelopes() {
        let flat = serde_json::json!({"error": "boom"});
        assert_eq!(error_message(&flat), "boom");

        let typed = serde_json::json!({"error": {"code": "TMUX_ERROR", "message": "no tmux"}});
        assert_eq!(error_message(&typed), "no tmux");

        assert_eq!(error_message(&Value::Null), "unknown error");
    }
}
