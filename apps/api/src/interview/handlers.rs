use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::document::DocumentPayload;
use crate::interview::dashboard::{CandidateQuery, CandidateSummary};
use crate::interview::engine::{ResumeStatus, SessionView};
use crate::models::session::{AppSnapshot, Tab};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Deserialize)]
pub struct TabSelection {
    pub tab: Tab,
}

/// GET /api/v1/state
pub async fn handle_get_state(State(state): State<AppState>) -> Json<AppSnapshot> {
    Json(state.interviewer.snapshot())
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.interviewer.active_session())
}

/// POST /api/v1/session/document
///
/// Expects a multipart body with a single `file` part.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let mut upload: Option<(String, String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, media_type, contents));
        break;
    }

    let (file_name, media_type, contents) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    let document = DocumentPayload::encode(
        file_name,
        &media_type,
        contents,
        state.config.max_upload_bytes,
    )?;

    let view = state.interviewer.upload_resume(document).await?;
    Ok(Json(view))
}

/// POST /api/v1/session/input
pub async fn handle_submit_input(
    State(state): State<AppState>,
    Json(req): Json<TextInput>,
) -> Result<Json<SessionView>, AppError> {
    let view = state.interviewer.submit_input(&req.text).await?;
    Ok(Json(view))
}

/// PUT /api/v1/session/draft
pub async fn handle_update_draft(
    State(state): State<AppState>,
    Json(req): Json<TextInput>,
) -> Result<StatusCode, AppError> {
    state.interviewer.update_draft(&req.text)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/session/pause
pub async fn handle_toggle_pause(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interviewer.toggle_pause()?))
}

/// POST /api/v1/session/resume
pub async fn handle_resume(State(state): State<AppState>) -> Json<ResumeStatus> {
    Json(state.interviewer.resume())
}

/// POST /api/v1/sessions
pub async fn handle_start_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(state.interviewer.start_new_session()))
}

/// PUT /api/v1/tab
pub async fn handle_set_tab(
    State(state): State<AppState>,
    Json(req): Json<TabSelection>,
) -> StatusCode {
    state.interviewer.set_active_tab(req.tab);
    StatusCode::NO_CONTENT
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateQuery>,
) -> Json<Vec<CandidateSummary>> {
    Json(state.interviewer.candidates(&query))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interviewer.session(id)?))
}
