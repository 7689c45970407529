//! Open editing sessions.
//!
//! Each open `(owner, resume)` pair owns one draft and its navigation state.
//! Sessions live in process memory until closed or evicted after sitting idle;
//! the draft itself survives only through saves and the session backup.

pub mod handlers;
pub mod view;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::navigation::{NavState, NavigationController, NavigationOutcome, NextStep};
use crate::document::{ResumeDraft, SectionKind};
use crate::errors::AppError;
use crate::persistence::repository::SaveAck;
use crate::persistence::PersistenceGateway;

pub struct EditorSession {
    owner: Uuid,
    draft: ResumeDraft,
    nav: NavigationController,
}

impl EditorSession {
    pub fn new(owner: Uuid, draft: ResumeDraft) -> Self {
        Self {
            owner,
            draft,
            nav: NavigationController::new(),
        }
    }

    pub fn draft(&self) -> &ResumeDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ResumeDraft {
        &mut self.draft
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    /// Moves forward to `target`, or to the section after the active one.
    /// An allowed move auto-saves first; a failed auto-save does not block it.
    pub async fn next(
        &mut self,
        gateway: &PersistenceGateway,
        target: Option<SectionKind>,
    ) -> Result<NavigationOutcome, AppError> {
        let active = self.draft.active_section();
        let target = match target {
            Some(target) => target,
            None => self.draft.order().after(active).ok_or_else(|| {
                AppError::Validation(format!("{} is the last section", active.display_name()))
            })?,
        };
        match self.nav.request_next(&self.draft, target) {
            NextStep::Proceed { target } => {
                gateway.auto_save(self.owner, &mut self.draft).await;
                Ok(self.nav.commit(&mut self.draft, target))
            }
            NextStep::Halt(outcome) => Ok(outcome),
        }
    }

    pub fn back(&mut self, target: Option<SectionKind>) -> Result<NavigationOutcome, AppError> {
        let active = self.draft.active_section();
        let target = match target {
            Some(target) => target,
            None => self.draft.order().before(active).ok_or_else(|| {
                AppError::Validation(format!("{} is the first section", active.display_name()))
            })?,
        };
        Ok(self.nav.back(&mut self.draft, target))
    }

    pub async fn confirm_skip(&mut self, gateway: &PersistenceGateway) -> Result<NavigationOutcome, AppError> {
        match self.nav.confirm_skip(&mut self.draft)? {
            NextStep::Proceed { target } => {
                gateway.auto_save(self.owner, &mut self.draft).await;
                Ok(self.nav.commit(&mut self.draft, target))
            }
            NextStep::Halt(outcome) => Ok(outcome),
        }
    }

    pub fn cancel(&mut self) -> NavigationOutcome {
        self.nav.cancel(&self.draft)
    }

    /// Skips `kind` directly. Any confirmation still pending is dropped, since
    /// it was asked for a section that may no longer be active.
    pub fn skip_section(&mut self, kind: SectionKind) -> Result<SectionKind, AppError> {
        let active = self.draft.skip_section(kind)?;
        self.nav.reset();
        Ok(active)
    }

    /// User-initiated save. Unlike auto-save, failures are returned.
    pub async fn save(&mut self, gateway: &PersistenceGateway) -> Result<SaveAck, AppError> {
        Ok(gateway.save(self.owner, &mut self.draft).await?)
    }
}

pub type SharedSession = Arc<Mutex<EditorSession>>;

struct OpenEditor {
    session: SharedSession,
    last_touched: Instant,
}

/// Open sessions keyed by `(owner, resume)`. Sessions untouched for longer
/// than the idle TTL are dropped by [`EditorRegistry::evict_idle`].
#[derive(Clone)]
pub struct EditorRegistry {
    sessions: Arc<Mutex<HashMap<(Uuid, Uuid), OpenEditor>>>,
    idle_ttl: Duration,
}

impl EditorRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    /// Returns the open session, loading the draft if there is none yet.
    pub async fn open(
        &self,
        gateway: &PersistenceGateway,
        owner: Uuid,
        resume_id: Uuid,
    ) -> Result<SharedSession, AppError> {
        if let Some(existing) = self.get(owner, resume_id).await {
            debug!("Editor for {resume_id} already open");
            return Ok(existing);
        }
        // Loading happens outside the lock; if another request opened the same
        // editor meanwhile, its session is kept.
        let draft = gateway.load(owner, resume_id).await?;
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry((owner, resume_id)).or_insert_with(|| {
            info!("Opened editor for resume {resume_id} ({:?})", draft.origin());
            OpenEditor {
                session: Arc::new(Mutex::new(EditorSession::new(owner, draft))),
                last_touched: Instant::now(),
            }
        });
        entry.last_touched = Instant::now();
        Ok(entry.session.clone())
    }

    /// Looks up an open session and marks it as used.
    pub async fn get(&self, owner: Uuid, resume_id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&(owner, resume_id))?;
        entry.last_touched = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn require(&self, owner: Uuid, resume_id: Uuid) -> Result<SharedSession, AppError> {
        self.get(owner, resume_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("No open editor for resume {resume_id}")))
    }

    /// Drops the session. Returns whether one was open.
    pub async fn close(&self, owner: Uuid, resume_id: Uuid) -> bool {
        let closed = self.sessions.lock().await.remove(&(owner, resume_id)).is_some();
        if closed {
            info!("Closed editor for resume {resume_id}");
        }
        closed
    }

    /// Drops sessions idle for longer than the TTL. A session whose lock is
    /// held by a request is in use and is kept. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|(_, resume_id), open| {
            let idle = open.last_touched.elapsed() > self.idle_ttl;
            let in_use = open.session.try_lock().is_err();
            if idle && !in_use {
                debug!("Evicting idle editor for resume {resume_id}");
                return false;
            }
            true
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle editor session(s)");
        }
        evicted
    }

    /// Runs [`EditorRegistry::evict_idle`] on a fixed period for the life of
    /// the process.
    pub fn spawn_eviction(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.evict_idle().await;
            }
        })
    }
}
