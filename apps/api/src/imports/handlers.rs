//! Axum route handlers for uploads and resume import.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Owner;
use crate::document::SectionKind;
use crate::errors::AppError;
use crate::imports::{extract_text, ExtractionError, UploadFormat};
use crate::persistence::repository::RepositoryError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub resume_id: Uuid,
    pub resume_name: Option<String>,
    /// Sections found in the text.
    pub sections: Vec<SectionKind>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/uploads/extract
///
/// Multipart form with a single `file` field (PDF, DOCX or plain text).
/// Returns the extracted text for the client to review before importing.
pub async fn handle_extract(
    _owner: Owner,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let format = UploadFormat::detect(field.content_type(), field.file_name())
            .ok_or(ExtractionError::UnsupportedFormat)?;
        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;

        let text = tokio::task::spawn_blocking(move || extract_text(format, &data))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;
        return Ok(Json(ExtractResponse { text }));
    }
    Err(AppError::Validation("No file provided".to_string()))
}

/// POST /api/v1/resumes/:id/import
///
/// Parses raw resume text into sections and stages it for the resume. An open
/// editor for the resume is closed so the next open adopts the import.
pub async fn handle_import(
    State(state): State<AppState>,
    owner: Owner,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    if request.raw_text.trim().is_empty() {
        return Err(AppError::Validation("raw_text cannot be empty".to_string()));
    }

    // Ids owned by another user are refused before anything is staged.
    match state.gateway.repository().get(resume_id, owner.user_id).await {
        Err(RepositoryError::Forbidden) => return Err(AppError::Forbidden),
        Err(RepositoryError::NotFound) | Ok(_) => {}
        Err(e) => warn!("Ownership check for import into {resume_id} failed: {e}"),
    }

    let document = state.generator.parse_document(&request.raw_text).await?;
    if document.is_empty() {
        return Err(AppError::Validation(
            "No resume information could be found in the text".to_string(),
        ));
    }

    state
        .gateway
        .stage_import(owner.user_id, resume_id, &document)
        .await?;
    state.editors.close(owner.user_id, resume_id).await;
    info!(
        "Import staged for resume {resume_id} ({} sections)",
        document.sections.len()
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ImportResponse {
            resume_id,
            resume_name: document.resume_name,
            sections: document.sections.keys().copied().collect(),
        }),
    ))
}
