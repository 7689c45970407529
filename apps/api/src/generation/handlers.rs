//! Axum route handlers for the AI writing assistance API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Owner;
use crate::document::SectionKind;
use crate::errors::AppError;
use crate::generation::{has_summary_material, DescriptionContext};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub section: String,
    /// The entry being described, in the section's entry shape.
    pub context: Value,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/summary
///
/// Writes a professional summary from the open draft. The result is returned,
/// not applied; the client sets it as the summary section if the user keeps it.
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    owner: Owner,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = state.editors.require(owner.user_id, request.resume_id).await?;
    // Copy the sections out so the editor stays usable during the model call.
    let sections = session.lock().await.draft().sections().clone();
    if !has_summary_material(&sections) {
        return Err(AppError::Validation(
            "Add some details to your resume before generating a summary".to_string(),
        ));
    }

    let summary = state.generator.generate_summary(&sections).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/ai/description
///
/// Writes a description for one employment, education or project entry.
pub async fn handle_generate_description(
    State(state): State<AppState>,
    _owner: Owner,
    Json(request): Json<DescriptionRequest>,
) -> Result<Json<DescriptionResponse>, AppError> {
    let kind = request.section.parse::<SectionKind>()?;
    let context = DescriptionContext::from_json(kind, request.context)?;
    let description = state.generator.generate_description(&context).await?;
    Ok(Json(DescriptionResponse { description }))
}
