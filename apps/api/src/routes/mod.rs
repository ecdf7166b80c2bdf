pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted document.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/state", get(handlers::handle_get_state))
        .route("/api/v1/tab", put(handlers::handle_set_tab))
        // Active session (interviewee)
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route(
            "/api/v1/session/document",
            post(handlers::handle_upload_document),
        )
        .route("/api/v1/session/input", post(handlers::handle_submit_input))
        .route("/api/v1/session/draft", put(handlers::handle_update_draft))
        .route("/api/v1/session/pause", post(handlers::handle_toggle_pause))
        .route("/api/v1/session/resume", post(handlers::handle_resume))
        .route("/api/v1/sessions", post(handlers::handle_start_session))
        // Dashboard (interviewer)
        .route("/api/v1/candidates", get(handlers::handle_list_candidates))
        .route("/api/v1/candidates/:id", get(handlers::handle_get_candidate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
