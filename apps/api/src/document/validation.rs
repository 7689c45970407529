//! Section validation rules.
//!
//! `is_valid` gates forward navigation. `is_completed` is the softer
//! "has something in it" check used for sidebar status.

use std::collections::BTreeSet;

use crate::document::section::SectionKind;
use crate::document::value::{PersonalDetails, SectionValue};

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Names of the mandatory personal-details fields that are still blank.
pub fn missing_personal_fields(pd: &PersonalDetails) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !filled(&pd.name) {
        missing.push("name");
    }
    if !filled(&pd.email) {
        missing.push("email");
    }
    missing
}

/// Whether `value` is complete enough to leave its section going forward.
///
/// Skipped sections are always valid. Personal details cannot be skipped, so
/// their rule applies unconditionally.
pub fn is_valid(value: &SectionValue, skipped: &BTreeSet<SectionKind>) -> bool {
    if let SectionValue::PersonalDetails(pd) = value {
        return missing_personal_fields(pd).is_empty();
    }
    if skipped.contains(&value.kind()) {
        return true;
    }
    match value {
        SectionValue::EmploymentHistory(jobs) => jobs
            .iter()
            .all(|j| filled(&j.company_name) && filled(&j.position) && filled(&j.start_date)),
        SectionValue::Education(schools) => schools.iter().all(|e| {
            filled(&e.school_name)
                && filled(&e.degree)
                && filled(&e.field_of_study)
                && filled(&e.start_date)
        }),
        SectionValue::Projects(projects) => projects
            .iter()
            .all(|p| filled(&p.project_name) && filled(&p.description)),
        _ => true,
    }
}

pub fn is_completed(value: &SectionValue, skipped: &BTreeSet<SectionKind>) -> bool {
    if skipped.contains(&value.kind()) {
        return true;
    }
    match value {
        SectionValue::PersonalDetails(pd) => missing_personal_fields(pd).is_empty(),
        SectionValue::Languages(langs) => langs.iter().any(|l| filled(&l.language)),
        other => !other.is_empty(),
    }
}
