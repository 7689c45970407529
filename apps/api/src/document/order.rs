//! Section ordering. Personal details always come first.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::document::section::{SectionKind, DEFAULT_ORDER};

/// Normalizes any sequence of kinds into a full ordering that starts with
/// `personal_details`.
///
/// Input order is kept for the kinds it contains (first occurrence wins);
/// kinds it lacks are appended in catalog order.
pub fn normalize(order: &[SectionKind]) -> Vec<SectionKind> {
    let mut out = Vec::with_capacity(DEFAULT_ORDER.len());
    out.push(SectionKind::PersonalDetails);
    for kind in order.iter().chain(DEFAULT_ORDER.iter()) {
        if !out.contains(kind) {
            out.push(*kind);
        }
    }
    out
}

/// A normalized ordering. Can only be built through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOrder(Vec<SectionKind>);

impl Default for SectionOrder {
    fn default() -> Self {
        Self(DEFAULT_ORDER.to_vec())
    }
}

impl SectionOrder {
    pub fn new(order: &[SectionKind]) -> Self {
        Self(normalize(order))
    }

    pub fn as_slice(&self) -> &[SectionKind] {
        &self.0
    }

    pub fn position(&self, kind: SectionKind) -> usize {
        // Every kind is present after normalization.
        self.0.iter().position(|k| *k == kind).unwrap_or(0)
    }

    pub fn after(&self, kind: SectionKind) -> Option<SectionKind> {
        self.0.get(self.position(kind) + 1).copied()
    }

    pub fn before(&self, kind: SectionKind) -> Option<SectionKind> {
        self.position(kind)
            .checked_sub(1)
            .and_then(|i| self.0.get(i).copied())
    }

    /// Kinds following `kind`, wrapping around, ending with `kind` itself.
    pub fn cyclic_from(&self, kind: SectionKind) -> impl Iterator<Item = SectionKind> + '_ {
        let start = self.position(kind) + 1;
        let len = self.0.len();
        (0..len).map(move |offset| self.0[(start + offset) % len])
    }
}

impl Serialize for SectionOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Ordering and skip set read from a stored `order` value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredOrder {
    pub order: Vec<SectionKind>,
    pub skipped: BTreeSet<SectionKind>,
}

/// Reads a stored ordering in either layout.
///
/// Arrays are the current layout. Objects are the legacy `{kind: is_skipped}`
/// layout: key order becomes the ordering and `true` values become skips.
/// Unknown kind names are dropped.
pub fn read_stored_order(value: &Value) -> StoredOrder {
    let mut stored = StoredOrder::default();
    match value {
        Value::Array(items) => {
            for item in items {
                match item.as_str().map(str::parse::<SectionKind>) {
                    Some(Ok(kind)) => stored.order.push(kind),
                    _ => warn!("Dropping unrecognised section {item} from stored order"),
                }
            }
        }
        Value::Object(map) => {
            for (key, skipped) in map {
                match key.parse::<SectionKind>() {
                    Ok(kind) => {
                        stored.order.push(kind);
                        if skipped.as_bool() == Some(true) && kind.is_skippable() {
                            stored.skipped.insert(kind);
                        }
                    }
                    Err(e) => warn!("Dropping legacy order key: {e}"),
                }
            }
        }
        Value::Null => {}
        other => warn!("Ignoring stored order of unexpected type: {other}"),
    }
    stored
}
