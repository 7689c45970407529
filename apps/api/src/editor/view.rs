//! Read-only projection of an open editor, returned by every editor route.

use serde::Serialize;
use uuid::Uuid;

use crate::document::customization::ResolvedCustomization;
use crate::document::navigation::NavState;
use crate::document::validation::{is_completed, is_valid};
use crate::document::{Origin, SectionKind, SectionValue};
use crate::editor::EditorSession;

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub kind: SectionKind,
    pub display_name: &'static str,
    pub skippable: bool,
    pub skipped: bool,
    pub valid: bool,
    pub completed: bool,
    pub value: SectionValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub resume_id: Uuid,
    pub resume_name: String,
    pub origin: Origin,
    pub active_section: SectionKind,
    pub nav: NavState,
    pub sections: Vec<SectionView>,
    pub customization: ResolvedCustomization,
}

impl EditorView {
    /// Sections are listed in the draft's current order.
    pub fn of(session: &EditorSession) -> Self {
        let draft = session.draft();
        let sections = draft
            .order()
            .as_slice()
            .iter()
            .map(|&kind| {
                let value = draft.section(kind);
                SectionView {
                    kind,
                    display_name: kind.display_name(),
                    skippable: kind.is_skippable(),
                    skipped: draft.is_skipped(kind),
                    valid: is_valid(value, draft.skipped()),
                    completed: is_completed(value, draft.skipped()),
                    value: value.clone(),
                }
            })
            .collect();

        EditorView {
            resume_id: draft.resume_id(),
            resume_name: draft.resume_name().to_string(),
            origin: draft.origin(),
            active_section: draft.active_section(),
            nav: session.nav_state(),
            sections,
            customization: draft.customization().resolve(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ResumeDraft;

    #[test]
    fn test_view_lists_sections_in_order_with_status() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        draft.reorder(&[SectionKind::Links]);
        draft.skip_section(SectionKind::Languages).unwrap();
        let view = EditorView::of(&EditorSession::new(Uuid::new_v4(), draft));

        assert_eq!(view.sections[0].kind, SectionKind::PersonalDetails);
        assert!(!view.sections[0].skippable);
        assert!(!view.sections[0].valid);
        assert_eq!(view.sections[1].kind, SectionKind::Links);

        let languages = view
            .sections
            .iter()
            .find(|s| s.kind == SectionKind::Languages)
            .unwrap();
        assert!(languages.skipped);
        assert!(languages.valid);
        assert!(languages.completed);
        assert!(!view.sections[1].completed);
    }

    #[test]
    fn test_view_serializes_nav_state_and_values() {
        let draft = ResumeDraft::new(Uuid::new_v4());
        let json = serde_json::to_value(EditorView::of(&EditorSession::new(Uuid::new_v4(), draft))).unwrap();
        assert_eq!(json["nav"]["state"], "idle");
        assert_eq!(json["origin"], "new");
        assert_eq!(json["active_section"], "personal_details");
        assert_eq!(json["sections"][0]["value"]["name"], "");
        assert_eq!(json["customization"]["template"], "melitta");
    }
}
