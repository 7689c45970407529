//! Axum route handlers for the Editor API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Owner;
use crate::document::navigation::{DenialReason, NavigationOutcome};
use crate::document::{SectionKind, SectionValue};
use crate::editor::view::EditorView;
use crate::editor::EditorSession;
use crate::errors::AppError;
use crate::persistence::repository::SaveAck;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub resume_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub navigation: NavigationOutcome,
    pub editor: EditorView,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub editor: EditorView,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_kind(raw: &str) -> Result<SectionKind, AppError> {
    Ok(raw.parse::<SectionKind>()?)
}

fn parse_target(body: Option<Json<NavigateRequest>>) -> Result<Option<SectionKind>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.target.as_deref().map(parse_kind).transpose()
}

/// Denials leave the editor untouched and are reported as errors.
fn respond(outcome: NavigationOutcome, session: &EditorSession) -> Result<Json<NavigationResponse>, AppError> {
    if let NavigationOutcome::Denied {
        reason: DenialReason::PersonalDetailsIncomplete { missing },
    } = outcome
    {
        return Err(AppError::PersonalDetailsIncomplete { missing });
    }
    Ok(Json(NavigationResponse {
        navigation: outcome,
        editor: EditorView::of(session),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/:id/editor
///
/// Opens the editor, hydrating the draft from a staged import, the session
/// backup or the repository. Opening an open editor returns it unchanged.
pub async fn handle_open_editor(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    let session = state
        .editors
        .open(&state.gateway, owner.user_id, resume_id)
        .await?;
    let session = session.lock().await;
    Ok(Json(EditorView::of(&session)))
}

/// GET /api/v1/resumes/:id/editor
pub async fn handle_get_editor(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<EditorView>, AppError> {
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let session = session.lock().await;
    Ok(Json(EditorView::of(&session)))
}

/// DELETE /api/v1/resumes/:id/editor
///
/// Discards unsaved edits. Idempotent.
pub async fn handle_close_editor(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> StatusCode {
    state.editors.close(owner.user_id, resume_id).await;
    StatusCode::NO_CONTENT
}

/// PUT /api/v1/resumes/:id/editor/name
pub async fn handle_rename(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<EditorView>, AppError> {
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    session.draft_mut().rename(&request.resume_name)?;
    Ok(Json(EditorView::of(&session)))
}

/// PUT /api/v1/resumes/:id/editor/sections/:kind
///
/// Replaces one section's value. The body is the bare value in the kind's
/// shape; `null` clears the section.
pub async fn handle_set_section(
    State(state): State<AppState>,
    owner: Owner,
    Path((resume_id, kind)): Path<(Uuid, String)>,
    Json(value): Json<Value>,
) -> Result<Json<EditorView>, AppError> {
    let kind = parse_kind(&kind)?;
    let value = SectionValue::from_json(kind, value)?;
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    session.draft_mut().set_section_value(value);
    Ok(Json(EditorView::of(&session)))
}

/// POST /api/v1/resumes/:id/editor/sections/:kind/skip
pub async fn handle_skip_section(
    State(state): State<AppState>,
    owner: Owner,
    Path((resume_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<EditorView>, AppError> {
    let kind = parse_kind(&kind)?;
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    session.skip_section(kind)?;
    Ok(Json(EditorView::of(&session)))
}

/// PUT /api/v1/resumes/:id/editor/order
///
/// Any list of kinds is accepted; personal details is moved to the front and
/// missing kinds are appended.
pub async fn handle_reorder(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<EditorView>, AppError> {
    let order = request
        .order
        .iter()
        .map(|raw| parse_kind(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    session.draft_mut().reorder(&order);
    Ok(Json(EditorView::of(&session)))
}

/// POST /api/v1/resumes/:id/editor/next
///
/// Body is optional: `{"target": "<kind>"}`. Without a target the editor moves
/// to the section after the active one.
pub async fn handle_next(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    body: Option<Json<NavigateRequest>>,
) -> Result<Json<NavigationResponse>, AppError> {
    let target = parse_target(body)?;
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    let outcome = session.next(&state.gateway, target).await?;
    respond(outcome, &session)
}

/// POST /api/v1/resumes/:id/editor/back
pub async fn handle_back(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    body: Option<Json<NavigateRequest>>,
) -> Result<Json<NavigationResponse>, AppError> {
    let target = parse_target(body)?;
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    let outcome = session.back(target)?;
    respond(outcome, &session)
}

/// POST /api/v1/resumes/:id/editor/confirm-skip
pub async fn handle_confirm_skip(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, AppError> {
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    let outcome = session.confirm_skip(&state.gateway).await?;
    respond(outcome, &session)
}

/// POST /api/v1/resumes/:id/editor/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, AppError> {
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    let outcome = session.cancel();
    respond(outcome, &session)
}

/// POST /api/v1/resumes/:id/editor/save
///
/// Explicit save. Unlike the auto-save on navigation, a failure is returned.
pub async fn handle_save(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<SaveResponse>, AppError> {
    let session = state.editors.require(owner.user_id, resume_id).await?;
    let mut session = session.lock().await;
    let ack = session.save(&state.gateway).await?;
    let updated_at = match ack {
        SaveAck::Confirmed { updated_at } => Some(updated_at),
        SaveAck::Empty => None,
    };
    Ok(Json(SaveResponse {
        saved: true,
        updated_at,
        editor: EditorView::of(&session),
    }))
}
