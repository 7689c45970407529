//! The in-memory resume draft: section values, ordering, skips and the active
//! section, plus where its data came from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::customization::Customization;
use crate::document::order::SectionOrder;
use crate::document::section::SectionKind;
use crate::document::value::{PartialDocument, SectionSet, SectionValue};

pub const DEFAULT_RESUME_NAME: &str = "My Resume";

/// Which data source populated the draft's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    New,
    Imported,
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Personal Details is mandatory and cannot be skipped")]
    CannotSkipMandatory,

    #[error("Resume name cannot be empty")]
    BlankName,
}

/// Everything about a draft that is worth storing. Ordering is normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeSnapshot {
    pub resume_id: Uuid,
    pub resume_name: String,
    pub sections: SectionSet,
    pub order: Vec<SectionKind>,
    pub skipped: BTreeSet<SectionKind>,
    pub customization: Customization,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is not a JSON object")]
    NotAnObject,

    #[error("Snapshot field '{0}' is missing or malformed")]
    Field(&'static str),
}

impl ResumeSnapshot {
    /// Reads a snapshot previously written with `serde_json::to_value`.
    pub fn from_json(value: &Value) -> Result<Self, SnapshotError> {
        let object = value.as_object().ok_or(SnapshotError::NotAnObject)?;
        let resume_id = object
            .get("resume_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(SnapshotError::Field("resume_id"))?;
        let resume_name = object
            .get("resume_name")
            .and_then(|v| v.as_str())
            .ok_or(SnapshotError::Field("resume_name"))?
            .to_string();
        let sections_raw = object
            .get("sections")
            .and_then(|v| v.as_object())
            .ok_or(SnapshotError::Field("sections"))?;
        let (sections, rejected) = SectionSet::from_json_lenient(sections_raw);
        for e in rejected {
            warn!("Snapshot for resume {resume_id}: {e}");
        }
        let order: Vec<SectionKind> = object
            .get("order")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|_| SnapshotError::Field("order"))?
            .unwrap_or_default();
        let skipped: BTreeSet<SectionKind> = object
            .get("skipped")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|_| SnapshotError::Field("skipped"))?
            .unwrap_or_default();
        let customization = object
            .get("customization")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|_| SnapshotError::Field("customization"))?
            .unwrap_or_default();
        Ok(Self {
            resume_id,
            resume_name,
            sections,
            order,
            skipped,
            customization,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDraft {
    resume_id: Uuid,
    resume_name: String,
    sections: SectionSet,
    order: SectionOrder,
    skipped: BTreeSet<SectionKind>,
    active_section: SectionKind,
    origin: Origin,
    customization: Customization,
}

impl ResumeDraft {
    /// A fresh draft: empty sections, catalog order, nothing skipped.
    pub fn new(resume_id: Uuid) -> Self {
        Self {
            resume_id,
            resume_name: DEFAULT_RESUME_NAME.to_string(),
            sections: SectionSet::default(),
            order: SectionOrder::default(),
            skipped: BTreeSet::new(),
            active_section: SectionKind::PersonalDetails,
            origin: Origin::New,
            customization: Customization::default(),
        }
    }

    /// Builds a draft from externally extracted data. Sections the import did
    /// not provide stay at their empty values.
    pub fn from_import(resume_id: Uuid, import: PartialDocument) -> Self {
        let mut draft = Self::new(resume_id);
        if let Some(name) = import.resume_name {
            draft.resume_name = name;
        }
        for value in import.sections.into_values() {
            draft.sections.put(value);
        }
        draft.origin = Origin::Imported;
        draft
    }

    pub fn from_snapshot(snapshot: ResumeSnapshot, origin: Origin) -> Self {
        let mut skipped = snapshot.skipped;
        skipped.remove(&SectionKind::PersonalDetails);
        let resume_name = if snapshot.resume_name.trim().is_empty() {
            DEFAULT_RESUME_NAME.to_string()
        } else {
            snapshot.resume_name
        };
        Self {
            resume_id: snapshot.resume_id,
            resume_name,
            sections: snapshot.sections,
            order: SectionOrder::new(&snapshot.order),
            skipped,
            active_section: SectionKind::PersonalDetails,
            origin,
            customization: snapshot.customization,
        }
    }

    pub fn snapshot(&self) -> ResumeSnapshot {
        ResumeSnapshot {
            resume_id: self.resume_id,
            resume_name: self.resume_name.clone(),
            sections: self.sections.clone(),
            order: self.order.as_slice().to_vec(),
            skipped: self.skipped.clone(),
            customization: self.customization,
        }
    }

    pub fn resume_id(&self) -> Uuid {
        self.resume_id
    }

    pub fn resume_name(&self) -> &str {
        &self.resume_name
    }

    pub fn sections(&self) -> &SectionSet {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> &SectionValue {
        self.sections.get(kind)
    }

    pub fn order(&self) -> &SectionOrder {
        &self.order
    }

    pub fn skipped(&self) -> &BTreeSet<SectionKind> {
        &self.skipped
    }

    pub fn is_skipped(&self, kind: SectionKind) -> bool {
        self.skipped.contains(&kind)
    }

    pub fn active_section(&self) -> SectionKind {
        self.active_section
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn customization(&self) -> Customization {
        self.customization
    }

    pub fn rename(&mut self, name: &str) -> Result<(), DraftError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DraftError::BlankName);
        }
        self.resume_name = name.to_string();
        Ok(())
    }

    pub fn set_customization(&mut self, customization: Customization) {
        self.customization = customization;
    }

    /// Replaces the value of the value's own section. Non-empty content lifts a
    /// previous skip.
    pub fn set_section_value(&mut self, value: SectionValue) {
        let kind = value.kind();
        if !value.is_empty() && self.skipped.remove(&kind) {
            debug!("Section {kind} un-skipped by new content");
        }
        self.sections.put(value);
    }

    /// Marks `kind` skipped, discards its content and moves the active section
    /// to the next one still open. Returns the new active section.
    pub fn skip_section(&mut self, kind: SectionKind) -> Result<SectionKind, DraftError> {
        if !kind.is_skippable() {
            return Err(DraftError::CannotSkipMandatory);
        }
        self.skipped.insert(kind);
        self.sections.reset(kind);
        self.active_section = self.next_open_after(kind);
        Ok(self.active_section)
    }

    pub fn reorder(&mut self, order: &[SectionKind]) {
        self.order = SectionOrder::new(order);
    }

    /// First section after `kind` (wrapping) that is personal details or not skipped.
    pub fn next_open_after(&self, kind: SectionKind) -> SectionKind {
        self.order
            .cyclic_from(kind)
            .find(|k| *k == SectionKind::PersonalDetails || !self.skipped.contains(k))
            .unwrap_or(SectionKind::PersonalDetails)
    }

    pub(crate) fn set_active_section(&mut self, kind: SectionKind) {
        self.active_section = kind;
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.origin = Origin::Persisted;
    }
}
