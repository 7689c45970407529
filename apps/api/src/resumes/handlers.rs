//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Owner;
use crate::document::customization::{Font, ResolvedCustomization, Template, Theme};
use crate::document::export::{project, ProjectedSection};
use crate::document::{Customization, Origin, ResumeDraft};
use crate::errors::AppError;
use crate::models::resume::ResumeSummary;
use crate::persistence::repository::RepositoryError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExportResponse<'a> {
    pub resume_id: Uuid,
    pub resume_name: &'a str,
    pub sections: Vec<ProjectedSection<'a>>,
    pub customization: ResolvedCustomization,
}

/// Omitted fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct CustomizationRequest {
    pub template: Option<String>,
    pub font: Option<String>,
    pub theme: Option<String>,
}

impl CustomizationRequest {
    fn apply_to(&self, mut current: Customization) -> Result<Customization, AppError> {
        if let Some(id) = &self.template {
            current.template = Template::from_id(id)
                .ok_or_else(|| AppError::Validation(format!("Unknown template '{id}'")))?;
        }
        if let Some(id) = &self.font {
            current.font =
                Font::from_id(id).ok_or_else(|| AppError::Validation(format!("Unknown font '{id}'")))?;
        }
        if let Some(id) = &self.theme {
            current.theme =
                Theme::from_id(id).ok_or_else(|| AppError::Validation(format!("Unknown theme '{id}'")))?;
        }
        Ok(current)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// The open editor's draft if there is one, otherwise the stored resume.
async fn current_draft(state: &AppState, owner: Uuid, resume_id: Uuid) -> Result<ResumeDraft, AppError> {
    if let Some(session) = state.editors.get(owner, resume_id).await {
        return Ok(session.lock().await.draft().clone());
    }
    let snapshot = state.gateway.repository().get(resume_id, owner).await?;
    Ok(ResumeDraft::from_snapshot(snapshot, Origin::Persisted))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/me
pub async fn handle_me(owner: Owner) -> Json<Owner> {
    Json(owner)
}

/// GET /api/v1/resumes
///
/// The owner's resumes, most recently updated first.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let resumes = state.gateway.repository().list(owner.user_id).await?;
    Ok(Json(resumes))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .gateway
        .repository()
        .delete(resume_id, owner.user_id)
        .await;
    // A never-saved resume can still have an open editor or a staged import.
    if matches!(deleted, Ok(()) | Err(RepositoryError::NotFound)) {
        state.editors.close(owner.user_id, resume_id).await;
        state.gateway.clear_session(owner.user_id, resume_id).await;
    }
    deleted?;
    info!("Deleted resume {resume_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/export
///
/// Every section in render order, plus the resolved presentation settings.
/// Reads the open draft when the editor is open, so unsaved edits are included.
pub async fn handle_export(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let draft = current_draft(&state, owner.user_id, resume_id).await?;
    let response = ExportResponse {
        resume_id,
        resume_name: draft.resume_name(),
        sections: project(&draft),
        customization: draft.customization().resolve(),
    };
    let body = serde_json::to_value(&response).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(body))
}

/// PUT /api/v1/resumes/:id/customization
///
/// The resume must already be saved. An open editor picks up the change too.
pub async fn handle_save_customization(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<CustomizationRequest>,
) -> Result<Json<ResolvedCustomization>, AppError> {
    let current = current_draft(&state, owner.user_id, resume_id).await?.customization();
    let customization = request.apply_to(current)?;

    state
        .gateway
        .repository()
        .save_customization(resume_id, owner.user_id, customization)
        .await?;
    if let Some(session) = state.editors.get(owner.user_id, resume_id).await {
        session.lock().await.draft_mut().set_customization(customization);
    }
    info!("Saved customization for resume {resume_id}");
    Ok(Json(customization.resolve()))
}
