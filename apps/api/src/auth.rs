//! Request authentication.
//!
//! Sessions are issued elsewhere; this service only reads the `cvforge_session`
//! cookie, a URL-encoded JSON object carrying the user id and an expiry in epoch
//! milliseconds.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "cvforge_session";

/// The authenticated user a request acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session cookie")]
    MissingSession,

    #[error("Session cookie is malformed: {0}")]
    Malformed(String),

    #[error("Session expired")]
    Expired,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Owner, AuthError>;
}

#[derive(Deserialize)]
struct SessionCookie {
    user_id: Uuid,
    email: String,
    expires_at: i64,
}

pub struct CookieSessionAuthenticator;

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[async_trait]
impl Authenticator for CookieSessionAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Owner, AuthError> {
        let raw = find_cookie(headers, SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
        let decoded = urlencoding::decode(raw).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let session: SessionCookie =
            serde_json::from_str(&decoded).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if Utc::now().timestamp_millis() > session.expires_at {
            return Err(AuthError::Expired);
        }
        Ok(Owner {
            user_id: session.user_id,
            email: session.email,
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate(&parts.headers)
            .await
            .map_err(|e| {
                debug!("Rejecting request: {e}");
                AppError::Unauthenticated
            })
    }
}
