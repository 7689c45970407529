use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::draft::DraftError;
use crate::document::navigation::NavigationError;
use crate::document::section::UnknownSection;
use crate::document::value::ShapeError;
use crate::generation::{DescriptionContextError, GenerationError};
use crate::imports::ExtractionError;
use crate::persistence::repository::RepositoryError;
use crate::persistence::session_store::SessionStoreError;
use crate::persistence::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Personal Details is mandatory and cannot be skipped")]
    CannotSkipMandatory,

    #[error("Personal details incomplete: missing {}", .missing.join(", "))]
    PersonalDetailsIncomplete { missing: Vec<&'static str> },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::CannotSkipMandatory => (
                StatusCode::CONFLICT,
                "CANNOT_SKIP_MANDATORY",
                self.to_string(),
            ),
            AppError::PersonalDetailsIncomplete { missing } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PERSONAL_DETAILS_INCOMPLETE",
                format!(
                    "Please fill in your {} before continuing",
                    missing.join(" and ")
                ),
            ),
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "Text generation failed, please try again".to_string(),
                )
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_ERROR",
                    "Your resume could not be saved, please try again".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::CannotSkipMandatory => AppError::CannotSkipMandatory,
            DraftError::BlankName => AppError::Validation(e.to_string()),
        }
    }
}

impl From<NavigationError> for AppError {
    fn from(e: NavigationError) -> Self {
        match e {
            NavigationError::NoPendingTransition => AppError::Validation(e.to_string()),
            NavigationError::Draft(e) => e.into(),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Forbidden => AppError::Forbidden,
            GatewayError::Save(e) => AppError::Persistence(e.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("Resume not found".to_string()),
            RepositoryError::Forbidden => AppError::Forbidden,
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::Encode(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<SessionStoreError> for AppError {
    fn from(e: SessionStoreError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Generation(e.to_string())
    }
}

impl From<DescriptionContextError> for AppError {
    fn from(e: DescriptionContextError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<UnknownSection> for AppError {
    fn from(e: UnknownSection) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<ShapeError> for AppError {
    fn from(e: ShapeError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::Validation(e.to_string())
    }
}
