//! Section catalog: the eight fixed section kinds and their static properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::value::{Links, PersonalDetails, SectionValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    PersonalDetails,
    ProfessionalSummary,
    Skills,
    EmploymentHistory,
    Education,
    Projects,
    Languages,
    Links,
}

/// The storage shape every value of a given kind must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Object,
    Text,
    TextList,
    ObjectList,
}

/// Catalog order used for brand-new resumes and for placing kinds missing from
/// a supplied ordering.
pub const DEFAULT_ORDER: [SectionKind; 8] = [
    SectionKind::PersonalDetails,
    SectionKind::Skills,
    SectionKind::EmploymentHistory,
    SectionKind::Education,
    SectionKind::Projects,
    SectionKind::Languages,
    SectionKind::Links,
    SectionKind::ProfessionalSummary,
];

impl SectionKind {
    /// Declaration order. Used as a stable index into fixed-size section tables.
    pub const ALL: [SectionKind; 8] = [
        SectionKind::PersonalDetails,
        SectionKind::ProfessionalSummary,
        SectionKind::Skills,
        SectionKind::EmploymentHistory,
        SectionKind::Education,
        SectionKind::Projects,
        SectionKind::Languages,
        SectionKind::Links,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::PersonalDetails => "personal_details",
            SectionKind::ProfessionalSummary => "professional_summary",
            SectionKind::Skills => "skills",
            SectionKind::EmploymentHistory => "employment_history",
            SectionKind::Education => "education",
            SectionKind::Projects => "projects",
            SectionKind::Languages => "languages",
            SectionKind::Links => "links",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SectionKind::PersonalDetails => "Personal Details",
            SectionKind::ProfessionalSummary => "Professional Summary",
            SectionKind::Skills => "Skills",
            SectionKind::EmploymentHistory => "Employment History",
            SectionKind::Education => "Education",
            SectionKind::Projects => "Projects",
            SectionKind::Languages => "Languages",
            SectionKind::Links => "Links",
        }
    }

    /// Personal details are mandatory; every other section may be skipped.
    pub fn is_skippable(self) -> bool {
        self != SectionKind::PersonalDetails
    }

    pub fn shape(self) -> ValueShape {
        match self {
            SectionKind::PersonalDetails | SectionKind::Links => ValueShape::Object,
            SectionKind::ProfessionalSummary => ValueShape::Text,
            SectionKind::Skills => ValueShape::TextList,
            SectionKind::EmploymentHistory
            | SectionKind::Education
            | SectionKind::Projects
            | SectionKind::Languages => ValueShape::ObjectList,
        }
    }

    /// The kind's empty value: empty object, empty string or empty list.
    pub fn default_value(self) -> SectionValue {
        match self {
            SectionKind::PersonalDetails => SectionValue::PersonalDetails(PersonalDetails::default()),
            SectionKind::ProfessionalSummary => SectionValue::ProfessionalSummary(String::new()),
            SectionKind::Skills => SectionValue::Skills(Vec::new()),
            SectionKind::EmploymentHistory => SectionValue::EmploymentHistory(Vec::new()),
            SectionKind::Education => SectionValue::Education(Vec::new()),
            SectionKind::Projects => SectionValue::Projects(Vec::new()),
            SectionKind::Languages => SectionValue::Languages(Vec::new()),
            SectionKind::Links => SectionValue::Links(Links::default()),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown section kind '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for SectionKind {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}
