//! Loading and saving drafts.
//!
//! A draft can come from three places: a freshly staged import, the session
//! backup written when that import was adopted, or the repository. `load`
//! resolves them in that order. The repository fetch is the only slow step, so
//! its result is discarded if an import was adopted while it was in flight.

pub mod repository;
pub mod session_store;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::{Origin, PartialDocument, ResumeDraft, ResumeSnapshot};
use crate::persistence::repository::{RepositoryError, ResumeRepository, SaveAck};
use crate::persistence::session_store::{SessionKeys, SessionStore, SessionStoreError};

const ADOPTED: &str = "1";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Resume belongs to another user")]
    Forbidden,

    #[error("Failed to save resume: {0}")]
    Save(#[source] RepositoryError),
}

#[derive(Clone)]
pub struct PersistenceGateway {
    repository: Arc<dyn ResumeRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl PersistenceGateway {
    pub fn new(repository: Arc<dyn ResumeRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    pub fn repository(&self) -> &Arc<dyn ResumeRepository> {
        &self.repository
    }

    pub async fn load(&self, owner: Uuid, resume_id: Uuid) -> Result<ResumeDraft, GatewayError> {
        let keys = SessionKeys::new(owner, resume_id);

        if let Some(draft) = self.adopt_staged_import(&keys, resume_id).await {
            return Ok(draft);
        }
        if let Some(draft) = self.restore_backup(&keys).await {
            return Ok(draft);
        }

        let fetched = self.repository.get(resume_id, owner).await;
        if let Err(RepositoryError::Forbidden) = fetched {
            return Err(GatewayError::Forbidden);
        }

        // An import may have been staged and adopted while the fetch was running.
        if let Some(draft) = self.adopt_staged_import(&keys, resume_id).await {
            info!("Discarding repository result for {resume_id}: import adopted during fetch");
            return Ok(draft);
        }
        if let Some(draft) = self.restore_backup(&keys).await {
            info!("Discarding repository result for {resume_id}: session backup present");
            return Ok(draft);
        }

        match fetched {
            Ok(snapshot) => {
                debug!("Loaded resume {resume_id} from repository");
                Ok(ResumeDraft::from_snapshot(snapshot, Origin::Persisted))
            }
            Err(RepositoryError::NotFound) => {
                debug!("Resume {resume_id} not stored yet, starting a new draft");
                Ok(ResumeDraft::new(resume_id))
            }
            Err(RepositoryError::Forbidden) => Err(GatewayError::Forbidden),
            Err(e) => {
                warn!("Failed to fetch resume {resume_id}, starting an empty draft: {e}");
                Ok(ResumeDraft::new(resume_id))
            }
        }
    }

    /// Persists the draft. On success the session slots are cleared so the next
    /// load reads from the repository.
    pub async fn save(&self, owner: Uuid, draft: &mut ResumeDraft) -> Result<SaveAck, GatewayError> {
        let snapshot = draft.snapshot();
        let ack = self
            .repository
            .save(owner, &snapshot)
            .await
            .map_err(|e| match e {
                RepositoryError::Forbidden => GatewayError::Forbidden,
                other => GatewayError::Save(other),
            })?;
        self.clear_session(owner, draft.resume_id()).await;
        draft.mark_persisted();
        info!("Saved resume {} ({ack:?})", draft.resume_id());
        Ok(ack)
    }

    /// Save triggered by navigation. Failures are logged and never returned.
    pub async fn auto_save(&self, owner: Uuid, draft: &mut ResumeDraft) {
        if let Err(e) = self.save(owner, draft).await {
            warn!("Auto-save of resume {} failed: {e}", draft.resume_id());
            if draft.origin() == Origin::Imported {
                let keys = SessionKeys::new(owner, draft.resume_id());
                self.write_backup(&keys, &draft.snapshot()).await;
            }
        }
    }

    pub async fn stage_import(
        &self,
        owner: Uuid,
        resume_id: Uuid,
        import: &PartialDocument,
    ) -> Result<(), SessionStoreError> {
        let keys = SessionKeys::new(owner, resume_id);
        let payload = serde_json::to_string(import).unwrap_or_else(|_| "{}".to_string());
        self.sessions.set(&keys.import_staging, &payload).await?;
        info!("Staged import for resume {resume_id}");
        Ok(())
    }

    pub async fn clear_session(&self, owner: Uuid, resume_id: Uuid) {
        let keys = SessionKeys::new(owner, resume_id);
        for key in [&keys.import_staging, &keys.session_backup, &keys.import_adopted] {
            if let Err(e) = self.sessions.remove(key).await {
                warn!("Failed to clear session slot {key}: {e}");
            }
        }
    }

    async fn adopt_staged_import(&self, keys: &SessionKeys, resume_id: Uuid) -> Option<ResumeDraft> {
        let raw = match self.sessions.take(&keys.import_staging).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read import staging for {resume_id}: {e}");
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unreadable import staging for {resume_id}: {e}");
                return None;
            }
        };
        let (import, rejected) = PartialDocument::from_json(&value);
        for e in rejected {
            warn!("Import for {resume_id}: {e}");
        }

        let draft = ResumeDraft::from_import(resume_id, import);
        self.write_backup(keys, &draft.snapshot()).await;
        if let Err(e) = self.sessions.set(&keys.import_adopted, ADOPTED).await {
            warn!("Failed to flag adopted import for {resume_id}: {e}");
        }
        info!("Adopted staged import for resume {resume_id}");
        Some(draft)
    }

    async fn restore_backup(&self, keys: &SessionKeys) -> Option<ResumeDraft> {
        match self.sessions.get(&keys.import_adopted).await {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read adopted flag: {e}");
                return None;
            }
        }
        let raw = match self.sessions.get(&keys.session_backup).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!("Adopted flag set without a session backup, clearing it");
                self.clear_flag(keys).await;
                return None;
            }
            Err(e) => {
                warn!("Failed to read session backup: {e}");
                return None;
            }
        };
        let snapshot = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|v| ResumeSnapshot::from_json(&v).ok());
        match snapshot {
            Some(snapshot) => {
                debug!("Restored resume {} from session backup", snapshot.resume_id);
                Some(ResumeDraft::from_snapshot(snapshot, Origin::Imported))
            }
            None => {
                warn!("Session backup is unreadable, clearing adopted flag");
                self.clear_flag(keys).await;
                None
            }
        }
    }

    async fn write_backup(&self, keys: &SessionKeys, snapshot: &ResumeSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(raw) => {
                if let Err(e) = self.sessions.set(&keys.session_backup, &raw).await {
                    warn!("Failed to write session backup: {e}");
                }
            }
            Err(e) => warn!("Failed to encode session backup: {e}"),
        }
    }

    async fn clear_flag(&self, keys: &SessionKeys) {
        if let Err(e) = self.sessions.remove(&keys.import_adopted).await {
            warn!("Failed to clear adopted flag: {e}");
        }
    }
}
