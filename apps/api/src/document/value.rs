//! Typed section values.
//!
//! Every section value crosses into the document through [`SectionValue::from_json`],
//! which picks the target shape from the section kind and rejects anything that
//! does not fit. `null` is read as the kind's empty value.

use std::collections::BTreeMap;

use serde::de::{self, Unexpected};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::document::section::{SectionKind, ValueShape};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

static EMPTY_PERSONAL_DETAILS: PersonalDetails = PersonalDetails {
    name: String::new(),
    email: String::new(),
    phone: None,
    photo_url: None,
    dob: None,
    address: None,
    city: None,
    state: None,
    zip: None,
    country: None,
};

impl PersonalDetails {
    fn is_empty(&self) -> bool {
        let optional = [
            &self.phone,
            &self.photo_url,
            &self.dob,
            &self.address,
            &self.city,
            &self.state,
            &self.zip,
            &self.country,
        ];
        self.name.is_empty() && self.email.is_empty() && optional.iter().all(|f| f.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Freelance,
    Internship,
    Volunteer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentEntry {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub employment_type: Option<EmploymentType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub proficiency: String,
}

/// Label → URL pairs.
pub type Links = BTreeMap<String, String>;

/// A section value tagged by its kind. Serializes as the bare value shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    PersonalDetails(PersonalDetails),
    ProfessionalSummary(String),
    Skills(Vec<String>),
    EmploymentHistory(Vec<EmploymentEntry>),
    Education(Vec<EducationEntry>),
    Projects(Vec<ProjectEntry>),
    Languages(Vec<LanguageEntry>),
    Links(Links),
}

#[derive(Debug, Error)]
#[error("Value for section '{kind}' does not match its shape: {source}")]
pub struct ShapeError {
    pub kind: SectionKind,
    #[source]
    pub source: serde_json::Error,
}

impl SectionValue {
    /// Parses a JSON value into the shape required by `kind`.
    pub fn from_json(kind: SectionKind, value: Value) -> Result<Self, ShapeError> {
        if value.is_null() {
            return Ok(kind.default_value());
        }
        let wrap = |source: serde_json::Error| ShapeError { kind, source };
        check_shape(kind.shape(), &value).map_err(wrap)?;
        Ok(match kind {
            SectionKind::PersonalDetails => {
                SectionValue::PersonalDetails(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::ProfessionalSummary => {
                SectionValue::ProfessionalSummary(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::Skills => SectionValue::Skills(serde_json::from_value(value).map_err(wrap)?),
            SectionKind::EmploymentHistory => {
                SectionValue::EmploymentHistory(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::Education => {
                SectionValue::Education(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::Projects => {
                SectionValue::Projects(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::Languages => {
                SectionValue::Languages(serde_json::from_value(value).map_err(wrap)?)
            }
            SectionKind::Links => SectionValue::Links(serde_json::from_value(value).map_err(wrap)?),
        })
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            SectionValue::PersonalDetails(_) => SectionKind::PersonalDetails,
            SectionValue::ProfessionalSummary(_) => SectionKind::ProfessionalSummary,
            SectionValue::Skills(_) => SectionKind::Skills,
            SectionValue::EmploymentHistory(_) => SectionKind::EmploymentHistory,
            SectionValue::Education(_) => SectionKind::Education,
            SectionValue::Projects(_) => SectionKind::Projects,
            SectionValue::Languages(_) => SectionKind::Languages,
            SectionValue::Links(_) => SectionKind::Links,
        }
    }

    /// Kind-specific emptiness: blank text, zero-length list, or an object with
    /// nothing filled in.
    pub fn is_empty(&self) -> bool {
        match self {
            SectionValue::PersonalDetails(pd) => pd.is_empty(),
            SectionValue::ProfessionalSummary(text) => text.trim().is_empty(),
            SectionValue::Skills(items) => items.is_empty(),
            SectionValue::EmploymentHistory(items) => items.is_empty(),
            SectionValue::Education(items) => items.is_empty(),
            SectionValue::Projects(items) => items.is_empty(),
            SectionValue::Languages(items) => items.is_empty(),
            SectionValue::Links(links) => links.is_empty(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

pub(crate) fn shape_mismatch(found: &Value, expected: &'static str) -> serde_json::Error {
    de::Error::invalid_type(unexpected(found), &expected)
}

/// Checks the outer JSON type before deserializing. The derived entry structs
/// would otherwise also accept arrays in positional form.
fn check_shape(shape: ValueShape, value: &Value) -> Result<(), serde_json::Error> {
    match (shape, value) {
        (ValueShape::Object, Value::Object(_))
        | (ValueShape::Text, Value::String(_))
        | (ValueShape::TextList, Value::Array(_)) => Ok(()),
        (ValueShape::ObjectList, Value::Array(items)) => match items.iter().find(|item| !item.is_object()) {
            Some(item) => Err(shape_mismatch(item, "an object entry")),
            None => Ok(()),
        },
        (ValueShape::Object, other) => Err(shape_mismatch(other, "an object")),
        (ValueShape::Text, other) => Err(shape_mismatch(other, "a string")),
        (ValueShape::TextList, other) => Err(shape_mismatch(other, "a list of strings")),
        (ValueShape::ObjectList, other) => Err(shape_mismatch(other, "a list of entries")),
    }
}

impl Serialize for SectionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SectionValue::PersonalDetails(v) => v.serialize(serializer),
            SectionValue::ProfessionalSummary(v) => v.serialize(serializer),
            SectionValue::Skills(v) => v.serialize(serializer),
            SectionValue::EmploymentHistory(v) => v.serialize(serializer),
            SectionValue::Education(v) => v.serialize(serializer),
            SectionValue::Projects(v) => v.serialize(serializer),
            SectionValue::Languages(v) => v.serialize(serializer),
            SectionValue::Links(v) => v.serialize(serializer),
        }
    }
}

/// One value per section kind, always complete.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSet {
    values: [SectionValue; 8],
}

impl Default for SectionSet {
    fn default() -> Self {
        Self {
            values: SectionKind::ALL.map(SectionKind::default_value),
        }
    }
}

impl SectionSet {
    pub fn get(&self, kind: SectionKind) -> &SectionValue {
        &self.values[kind.index()]
    }

    /// Stores `value` under its own kind and returns the value it replaced.
    pub fn put(&mut self, value: SectionValue) -> SectionValue {
        let slot = &mut self.values[value.kind().index()];
        std::mem::replace(slot, value)
    }

    pub fn reset(&mut self, kind: SectionKind) {
        self.values[kind.index()] = kind.default_value();
    }

    pub fn personal_details(&self) -> &PersonalDetails {
        match self.get(SectionKind::PersonalDetails) {
            SectionValue::PersonalDetails(pd) => pd,
            // `put` indexes by the value's own kind, so this arm is never taken.
            _ => &EMPTY_PERSONAL_DETAILS,
        }
    }

    /// Reads a `{kind: value}` object. Unknown keys are ignored; values that do
    /// not fit their shape are reported and left at the kind's empty value.
    pub fn from_json_lenient(object: &serde_json::Map<String, Value>) -> (Self, Vec<ShapeError>) {
        let mut set = SectionSet::default();
        let mut rejected = Vec::new();
        for kind in SectionKind::ALL {
            if let Some(raw) = object.get(kind.as_str()) {
                match SectionValue::from_json(kind, raw.clone()) {
                    Ok(value) => {
                        set.put(value);
                    }
                    Err(e) => rejected.push(e),
                }
            }
        }
        (set, rejected)
    }
}

impl Serialize for SectionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for value in &self.values {
            map.serialize_entry(value.kind().as_str(), value)?;
        }
        map.end()
    }
}

/// Externally extracted resume data: only the sections the source actually had.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialDocument {
    pub resume_name: Option<String>,
    pub sections: BTreeMap<SectionKind, SectionValue>,
}

impl PartialDocument {
    /// Reads a flat `{resume_name?, <section>: value, ...}` object.
    /// `null` sections count as absent; mis-shaped sections are dropped and reported.
    pub fn from_json(value: &Value) -> (Self, Vec<ShapeError>) {
        let mut doc = PartialDocument::default();
        let mut rejected = Vec::new();
        let Some(object) = value.as_object() else {
            return (doc, rejected);
        };
        doc.resume_name = object
            .get("resume_name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        for kind in SectionKind::ALL {
            match object.get(kind.as_str()) {
                None | Some(Value::Null) => {}
                Some(raw) => match SectionValue::from_json(kind, raw.clone()) {
                    Ok(v) => {
                        doc.sections.insert(kind, v);
                    }
                    Err(e) => rejected.push(e),
                },
            }
        }
        (doc, rejected)
    }

    pub fn is_empty(&self) -> bool {
        self.resume_name.is_none() && self.sections.is_empty()
    }
}

impl Serialize for PartialDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.resume_name {
            map.serialize_entry("resume_name", name)?;
        }
        for (kind, value) in &self.sections {
            map.serialize_entry(kind.as_str(), value)?;
        }
        map.end()
    }
}
