use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `resumes`. Section columns hold raw JSON; shape checks happen
/// when the row is turned into a snapshot.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub resume_id: Uuid,
    pub user_id: Uuid,
    pub resume_name: String,
    pub personal_details: Option<Value>,
    pub professional_summary: Option<String>,
    pub skills: Option<Value>,
    pub employment_history: Option<Value>,
    pub education: Option<Value>,
    pub projects: Option<Value>,
    pub languages: Option<Value>,
    pub links: Option<Value>,
    pub section_order: Option<Value>,
    pub skipped_sections: Option<Value>,
    pub customization: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeSummary {
    pub resume_id: Uuid,
    pub resume_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
