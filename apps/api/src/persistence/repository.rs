//! Durable resume storage.
//!
//! `PgResumeRepository` is the production backend. Rows are read through the
//! document shape checks, so a stored value of the wrong shape degrades to the
//! section's empty value instead of reaching the editor.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::order::read_stored_order;
use crate::document::{Customization, ResumeSnapshot, SectionKind, SectionSet, SectionValue};
use crate::models::resume::{ResumeRow, ResumeSummary};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Resume not found")]
    NotFound,

    #[error("Resume belongs to another user")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to encode resume: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Acknowledgement of a save. A backend that accepts the write but reports
/// nothing back answers `Empty`; both variants mean the write succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAck {
    Confirmed { updated_at: DateTime<Utc> },
    Empty,
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn get(&self, resume_id: Uuid, owner: Uuid) -> Result<ResumeSnapshot, RepositoryError>;

    /// Creates or replaces the resume. Fails with `Forbidden` if the id is
    /// already taken by another owner.
    async fn save(&self, owner: Uuid, snapshot: &ResumeSnapshot) -> Result<SaveAck, RepositoryError>;

    async fn delete(&self, resume_id: Uuid, owner: Uuid) -> Result<(), RepositoryError>;

    /// Most recently updated first.
    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeSummary>, RepositoryError>;

    async fn save_customization(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        customization: Customization,
    ) -> Result<(), RepositoryError>;
}

fn read_skipped(value: &Value) -> BTreeSet<SectionKind> {
    let Some(items) = value.as_array() else {
        warn!("Ignoring stored skip set of unexpected type: {value}");
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(|item| match item.as_str().map(str::parse::<SectionKind>) {
            Some(Ok(kind)) if kind.is_skippable() => Some(kind),
            _ => {
                warn!("Dropping stored skip entry {item}");
                None
            }
        })
        .collect()
}

/// Converts a stored row into a snapshot, migrating legacy ordering on the way.
pub fn snapshot_from_row(row: ResumeRow) -> ResumeSnapshot {
    let resume_id = row.resume_id;
    let columns = [
        (SectionKind::PersonalDetails, row.personal_details),
        (
            SectionKind::ProfessionalSummary,
            row.professional_summary.map(Value::String),
        ),
        (SectionKind::Skills, row.skills),
        (SectionKind::EmploymentHistory, row.employment_history),
        (SectionKind::Education, row.education),
        (SectionKind::Projects, row.projects),
        (SectionKind::Languages, row.languages),
        (SectionKind::Links, row.links),
    ];
    let mut raw = serde_json::Map::new();
    for (kind, value) in columns {
        if let Some(value) = value {
            raw.insert(kind.as_str().to_string(), value);
        }
    }
    let (sections, rejected) = SectionSet::from_json_lenient(&raw);
    for e in rejected {
        warn!("Resume {resume_id}: {e}; using the empty value");
    }

    let stored = row
        .section_order
        .as_ref()
        .map(read_stored_order)
        .unwrap_or_default();
    let mut skipped = stored.skipped;
    if let Some(value) = &row.skipped_sections {
        skipped.extend(read_skipped(value));
    }

    let customization = match row.customization.map(serde_json::from_value::<Customization>) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            warn!("Resume {resume_id}: unreadable customization ({e}); using defaults");
            Customization::default()
        }
        None => Customization::default(),
    };

    ResumeSnapshot {
        resume_id,
        resume_name: row.resume_name,
        sections,
        order: stored.order,
        skipped,
        customization,
    }
}

#[derive(Clone)]
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tells apart "no such resume" from "someone else's resume".
    async fn absent(&self, resume_id: Uuid) -> RepositoryError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM resumes WHERE resume_id = $1)",
        )
        .bind(resume_id)
        .fetch_one(&self.pool)
        .await;
        match exists {
            Ok(true) => RepositoryError::Forbidden,
            Ok(false) => RepositoryError::NotFound,
            Err(e) => RepositoryError::Database(e),
        }
    }
}

fn section_json(sections: &SectionSet, kind: SectionKind) -> Value {
    sections.get(kind).to_json()
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn get(&self, resume_id: Uuid, owner: Uuid) -> Result<ResumeSnapshot, RepositoryError> {
        let row: Option<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes WHERE resume_id = $1 AND user_id = $2")
                .bind(resume_id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        match row {
            Some(row) => Ok(snapshot_from_row(row)),
            None => Err(self.absent(resume_id).await),
        }
    }

    async fn save(&self, owner: Uuid, snapshot: &ResumeSnapshot) -> Result<SaveAck, RepositoryError> {
        let summary = match snapshot.sections.get(SectionKind::ProfessionalSummary) {
            SectionValue::ProfessionalSummary(text) => text.clone(),
            _ => String::new(),
        };
        let order = serde_json::to_value(&snapshot.order)?;
        let skipped = serde_json::to_value(&snapshot.skipped)?;
        let customization = serde_json::to_value(snapshot.customization)?;
        let s = &snapshot.sections;

        let updated_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO resumes
                (resume_id, user_id, resume_name, personal_details, professional_summary,
                 skills, employment_history, education, projects, languages, links,
                 section_order, skipped_sections, customization)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (resume_id) DO UPDATE SET
                resume_name = EXCLUDED.resume_name,
                personal_details = EXCLUDED.personal_details,
                professional_summary = EXCLUDED.professional_summary,
                skills = EXCLUDED.skills,
                employment_history = EXCLUDED.employment_history,
                education = EXCLUDED.education,
                projects = EXCLUDED.projects,
                languages = EXCLUDED.languages,
                links = EXCLUDED.links,
                section_order = EXCLUDED.section_order,
                skipped_sections = EXCLUDED.skipped_sections,
                customization = EXCLUDED.customization,
                updated_at = NOW()
            WHERE resumes.user_id = EXCLUDED.user_id
            RETURNING updated_at
            "#,
        )
        .bind(snapshot.resume_id)
        .bind(owner)
        .bind(&snapshot.resume_name)
        .bind(section_json(s, SectionKind::PersonalDetails))
        .bind(summary)
        .bind(section_json(s, SectionKind::Skills))
        .bind(section_json(s, SectionKind::EmploymentHistory))
        .bind(section_json(s, SectionKind::Education))
        .bind(section_json(s, SectionKind::Projects))
        .bind(section_json(s, SectionKind::Languages))
        .bind(section_json(s, SectionKind::Links))
        .bind(order)
        .bind(skipped)
        .bind(customization)
        .fetch_optional(&self.pool)
        .await?;

        // The conflict clause skips the update when the row has another owner,
        // which leaves nothing to return.
        match updated_at {
            Some(updated_at) => {
                debug!("Saved resume {} for {owner}", snapshot.resume_id);
                Ok(SaveAck::Confirmed { updated_at })
            }
            None => Err(RepositoryError::Forbidden),
        }
    }

    async fn delete(&self, resume_id: Uuid, owner: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM resumes WHERE resume_id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(self.absent(resume_id).await);
        }
        Ok(())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<ResumeSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResumeSummary>(
            "SELECT resume_id, resume_name, created_at, updated_at FROM resumes \
             WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn save_customization(
        &self,
        resume_id: Uuid,
        owner: Uuid,
        customization: Customization,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE resumes SET customization = $3, updated_at = NOW() \
             WHERE resume_id = $1 AND user_id = $2",
        )
        .bind(resume_id)
        .bind(owner)
        .bind(serde_json::to_value(customization)?)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(self.absent(resume_id).await);
        }
        Ok(())
    }
}
