//! Route registration for the dashboard API.

use super::*;

use axum::routing::patch;

pub(super) fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // tmux session lifecycle
        .route("/api/tmux/sessions", get(list_sessions).post(create_session))
        .route("/api/tmux/sessions/all", delete(delete_all_sessions))
        .route(
            "/api/tmux/sessions/:name",
            patch(rename_session).delete(delete_session),
        )
        .route("/api/tmux/appearance", post(apply_appearance))
        // file browser
        .route("/api/files/resources", get(list_roots))
        .route("/api/files/resources/", get(list_roots))
        .route(
            "/api/files/resources/*path",
            get(get_resource)
                .post(create_resource)
                .patch(rename_resource)
                .delete(delete_resource),
        )
        .route("/api/files/raw/*path", get(download_resource))
        // beads work tracking
        .route("/api/beads/health", get(beads_health))
        .route("/api/beads/issues", get(beads_issues))
        .route("/api/beads/triage", get(beads_triage))
        .route("/api/beads/insights", get(beads_insights))
        .route("/api/beads/plan", get(beads_plan))
        .route("/api/beads/projects", get(beads_projects))
}
