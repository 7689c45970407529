use serde::Serialize;

use crate::document::draft::ResumeDraft;
use crate::document::order::normalize;
use crate::document::section::SectionKind;
use crate::document::value::SectionValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedSection<'a> {
    pub kind: SectionKind,
    pub display_name: &'static str,
    pub skipped: bool,
    pub value: &'a SectionValue,
}

/// Every section of the draft in render order. Skipped and empty sections are
/// included; deciding what to show is left to the renderer.
pub fn project(draft: &ResumeDraft) -> Vec<ProjectedSection<'_>> {
    normalize(draft.order().as_slice())
        .into_iter()
        .map(|kind| ProjectedSection {
            kind,
            display_name: kind.display_name(),
            skipped: draft.is_skipped(kind),
            value: draft.section(kind),
        })
        .collect()
}
