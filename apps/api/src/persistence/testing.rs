//! In-memory repository used by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::document::{Customization, ResumeSnapshot};
use crate::models::resume::ResumeSummary;
use crate::persistence::repository::{RepositoryError, ResumeRepository, SaveAck};

struct Stored {
    owner: Uuid,
    snapshot: ResumeSnapshot,
    summary: ResumeSummary,
}

#[derive(Default)]
pub struct InMemoryResumeRepository {
    rows: Mutex<HashMap<Uuid, Stored>>,
    get_delay: Option<Duration>,
    pub fail_gets: AtomicBool,
    pub fail_saves: AtomicBool,
    pub empty_acks: AtomicBool,
    pub get_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
}

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl InMemoryResumeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `get` sleeps for `delay` before answering.
    pub fn with_get_delay(delay: Duration) -> Self {
        Self {
            get_delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn insert(&self, owner: Uuid, snapshot: ResumeSnapshot) {
        let now = Utc::now();
        let summary = ResumeSummary {
            resume_id: snapshot.resume_id,
            resume_name: snapshot.resume_name.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.insert(
            snapshot.resume_id,
            Stored {
                owner,
                snapshot,
                summary,
            },
        );
    }

    pub async fn stored(&self, resume_id: Uuid) -> Option<ResumeSnapshot> {
        self.rows
            .lock()
            .await
            .get(&resume_id)
            .map(|s| s.snapshot.clone())
    }

    fn check_owner(stored: Option<&Stored>, owner: Uuid) -> Result<(), RepositoryError> {
        match stored {
            None => Err(RepositoryError::NotFound),
            Some(s) if s.owner != owner => Err(RepositoryError::Forbidden),
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumeRepository {
    async fn get(&self, resume_id: Uuid, owner: Uuid) -> Result<ResumeSnapshot, RepositoryError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let rows = self.rows.lock().await;
        let stored = rows.get(&resume_id);
        Self::check_owner(stored, owner)?;
        stored
            .map(|s| s.snapshot.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, owner: Uuid, snapshot: &ResumeSnapshot) -> Result<SaveAck, RepositoryError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut rows = self.rows.lock().await;
        let now = Utc::now();
        let created_at = match rows.get(&snapshot.resume_id) {
            Some(s) if s.owner != owner => return Err(RepositoryError::Forbidden),
            Some(s) => s.summary.created_at,
            None => now,
        };
        rows.insert(
            snapshot.resume_id,
            Stored {
                owner,
                snapshot: snapshot.clone(),
                summary: ResumeSummary {
                    resume_id: snapshot.resume_id,
                    resume_name: snapshot.resume_name.clone(),
                    created_at,
                    updated_at: now,
                },
            },
        );
        if self.empty_acks.load(Ordering::SeqCst) {
            Ok(SaveAck::Empty)
        } else {
            Ok(SaveAck::Confirmed { updated_at: now })
        }
    }

    async fn delete(&self, resume_id: Uuid, owner: Uuid) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        Self::check_owner(rows.get(&resume_id), owner)?;
        rows.remove(&resume_id);
        Ok(())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeSummary>, RepositoryError> {
        let rows = self.rows.lock().await;
        let mut out: Vec<ResumeSummary> = rows
            .values()
            .filter(|s| s.owner == owner)
            .map(|s| s.summary.clone())
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn save_customization(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        customization: Customization,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;
        Self::check_owner(rows.get(&resume_id), owner)?;
        if let Some(stored) = rows.get_mut(&resume_id) {
            stored.snapshot.customization = customization;
            stored.summary.updated_at = Utc::now();
        }
        Ok(())
    }
}
