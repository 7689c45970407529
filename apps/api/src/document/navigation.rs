//! Forward/back navigation over a draft's sections.
//!
//! The controller never persists anything itself. A forward move is split in
//! two: [`NavigationController::request_next`] decides whether the move may
//! happen, and [`NavigationController::commit`] applies it. The editor session
//! runs the auto-save between the two.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::document::draft::{DraftError, ResumeDraft};
use crate::document::section::SectionKind;
use crate::document::validation::{is_valid, missing_personal_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavState {
    #[default]
    Idle,
    AwaitingSkipConfirmation {
        section: SectionKind,
        pending_target: SectionKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenialReason {
    PersonalDetailsIncomplete { missing: Vec<&'static str> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Transitioned {
        section: SectionKind,
    },
    AwaitingConfirmation {
        section: SectionKind,
        display_name: &'static str,
        pending_target: SectionKind,
    },
    Denied {
        reason: DenialReason,
    },
    /// A pending transition was cancelled; the active section did not change.
    Stayed {
        section: SectionKind,
    },
}

/// Result of asking to move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// The move is allowed. Persist, then [`NavigationController::commit`].
    Proceed { target: SectionKind },
    Halt(NavigationOutcome),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No section transition is awaiting confirmation")]
    NoPendingTransition,

    #[error(transparent)]
    Draft(#[from] DraftError),
}

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    state: NavState,
}

fn personal_details_gate(draft: &ResumeDraft) -> Option<NavigationOutcome> {
    let missing = missing_personal_fields(draft.sections().personal_details());
    if missing.is_empty() {
        None
    } else {
        Some(NavigationOutcome::Denied {
            reason: DenialReason::PersonalDetailsIncomplete { missing },
        })
    }
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn request_next(&mut self, draft: &ResumeDraft, target: SectionKind) -> NextStep {
        if let Some(denied) = personal_details_gate(draft) {
            debug!("Next to {target} denied: personal details incomplete");
            self.state = NavState::Idle;
            return NextStep::Halt(denied);
        }

        let active = draft.active_section();
        if active != SectionKind::PersonalDetails && !is_valid(draft.section(active), draft.skipped()) {
            debug!("Section {active} incomplete, awaiting skip confirmation before {target}");
            self.state = NavState::AwaitingSkipConfirmation {
                section: active,
                pending_target: target,
            };
            return NextStep::Halt(NavigationOutcome::AwaitingConfirmation {
                section: active,
                display_name: active.display_name(),
                pending_target: target,
            });
        }

        NextStep::Proceed { target }
    }

    pub fn commit(&mut self, draft: &mut ResumeDraft, target: SectionKind) -> NavigationOutcome {
        self.state = NavState::Idle;
        draft.set_active_section(target);
        NavigationOutcome::Transitioned { section: target }
    }

    /// Moves backwards without validating or persisting anything.
    pub fn back(&mut self, draft: &mut ResumeDraft, target: SectionKind) -> NavigationOutcome {
        self.commit(draft, target)
    }

    /// Skips the section that asked for confirmation and releases the
    /// transition that was waiting on it. A confirmation is only honoured while
    /// that section is still the active one.
    pub fn confirm_skip(&mut self, draft: &mut ResumeDraft) -> Result<NextStep, NavigationError> {
        let NavState::AwaitingSkipConfirmation {
            section,
            pending_target,
        } = self.state
        else {
            return Err(NavigationError::NoPendingTransition);
        };
        if draft.active_section() != section {
            debug!("Dropping stale skip confirmation for {section}");
            self.state = NavState::Idle;
            return Err(NavigationError::NoPendingTransition);
        }
        // Personal details may have been edited while the dialog was open.
        if let Some(denied) = personal_details_gate(draft) {
            self.state = NavState::Idle;
            return Ok(NextStep::Halt(denied));
        }
        draft.skip_section(section)?;
        Ok(NextStep::Proceed {
            target: pending_target,
        })
    }

    /// Forgets any pending confirmation.
    pub fn reset(&mut self) {
        self.state = NavState::Idle;
    }

    pub fn cancel(&mut self, draft: &ResumeDraft) -> NavigationOutcome {
        self.reset();
        NavigationOutcome::Stayed {
            section: draft.active_section(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value::{EducationEntry, EmploymentEntry, PersonalDetails as Details, SectionValue};
    use uuid::Uuid;
    use SectionKind::*;

    fn jane() -> SectionValue {
        SectionValue::PersonalDetails(Details {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            ..Default::default()
        })
    }

    /// Request and, if allowed, commit straight away.
    fn next(nav: &mut NavigationController, draft: &mut ResumeDraft, target: SectionKind) -> NavigationOutcome {
        match nav.request_next(draft, target) {
            NextStep::Proceed { target } => nav.commit(draft, target),
            NextStep::Halt(outcome) => outcome,
        }
    }

    #[test]
    fn test_next_denied_until_personal_details_complete() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        let mut nav = NavigationController::new();
        assert_eq!(
            next(&mut nav, &mut draft, Skills),
            NavigationOutcome::Denied {
                reason: DenialReason::PersonalDetailsIncomplete {
                    missing: vec!["name", "email"]
                }
            }
        );
        assert_eq!(draft.active_section(), PersonalDetails);
    }

    #[test]
    fn test_personal_details_checked_from_any_section() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        let mut nav = NavigationController::new();
        nav.back(&mut draft, Languages);
        let outcome = next(&mut nav, &mut draft, Links);
        assert!(matches!(outcome, NavigationOutcome::Denied { .. }));
        assert_eq!(draft.active_section(), Languages);
    }

    #[test]
    fn test_back_is_unconditional_and_clears_pending() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        draft.set_section_value(jane());
        let mut nav = NavigationController::new();
        nav.back(&mut draft, EmploymentHistory);
        draft.set_section_value(SectionValue::EmploymentHistory(vec![EmploymentEntry::default()]));
        next(&mut nav, &mut draft, Education);
        assert!(matches!(nav.state(), NavState::AwaitingSkipConfirmation { .. }));

        assert_eq!(
            nav.back(&mut draft, Skills),
            NavigationOutcome::Transitioned { section: Skills }
        );
        assert_eq!(nav.state(), NavState::Idle);
        assert_eq!(nav.confirm_skip(&mut draft), Err(NavigationError::NoPendingTransition));
    }

    #[test]
    fn test_cancel_keeps_active_section() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        draft.set_section_value(jane());
        let mut nav = NavigationController::new();
        nav.back(&mut draft, Projects);
        draft.set_section_value(SectionValue::Projects(vec![Default::default()]));
        assert!(matches!(
            next(&mut nav, &mut draft, Languages),
            NavigationOutcome::AwaitingConfirmation { section: Projects, .. }
        ));
        assert_eq!(nav.cancel(&draft), NavigationOutcome::Stayed { section: Projects });
        assert_eq!(nav.state(), NavState::Idle);
        assert!(!draft.is_skipped(Projects));
    }

    #[test]
    fn test_confirm_skip_rejects_if_personal_details_emptied_meanwhile() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        draft.set_section_value(jane());
        let mut nav = NavigationController::new();
        nav.back(&mut draft, Education);
        draft.set_section_value(SectionValue::Education(vec![Default::default()]));
        next(&mut nav, &mut draft, Projects);
        draft.set_section_value(PersonalDetails.default_value());

        let step = nav.confirm_skip(&mut draft).unwrap();
        assert!(matches!(step, NextStep::Halt(NavigationOutcome::Denied { .. })));
        assert!(!draft.is_skipped(Education));
        assert_eq!(nav.state(), NavState::Idle);
    }

    #[test]
    fn test_stale_confirmation_cannot_skip_another_section() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        draft.set_section_value(jane());
        let school = EducationEntry {
            school_name: "MIT".into(),
            degree: "BSc".into(),
            field_of_study: "Physics".into(),
            start_date: "2015".into(),
            ..Default::default()
        };
        draft.set_section_value(SectionValue::Education(vec![school.clone()]));
        let mut nav = NavigationController::new();
        nav.back(&mut draft, EmploymentHistory);
        draft.set_section_value(SectionValue::EmploymentHistory(vec![EmploymentEntry::default()]));
        assert!(matches!(
            next(&mut nav, &mut draft, Projects),
            NavigationOutcome::AwaitingConfirmation { section: EmploymentHistory, .. }
        ));
        assert_eq!(
            nav.state(),
            NavState::AwaitingSkipConfirmation {
                section: EmploymentHistory,
                pending_target: Projects
            }
        );

        // Skipped directly, which moves the editor on to education.
        draft.skip_section(EmploymentHistory).unwrap();
        assert_eq!(draft.active_section(), Education);

        assert_eq!(nav.confirm_skip(&mut draft), Err(NavigationError::NoPendingTransition));
        assert_eq!(nav.state(), NavState::Idle);
        assert!(!draft.is_skipped(Education));
        assert_eq!(draft.section(Education), &SectionValue::Education(vec![school]));
        assert_eq!(draft.active_section(), Education);
    }

    #[test]
    fn test_end_to_end_new_resume_scenario() {
        let mut draft = ResumeDraft::new(Uuid::new_v4());
        let mut nav = NavigationController::new();

        draft.set_section_value(jane());
        assert_eq!(
            next(&mut nav, &mut draft, Skills),
            NavigationOutcome::Transitioned { section: Skills }
        );
        assert_eq!(
            next(&mut nav, &mut draft, EmploymentHistory),
            NavigationOutcome::Transitioned { section: EmploymentHistory }
        );

        draft.set_section_value(SectionValue::EmploymentHistory(vec![EmploymentEntry {
            company_name: "Acme".into(),
            ..Default::default()
        }]));
        assert_eq!(
            next(&mut nav, &mut draft, Education),
            NavigationOutcome::AwaitingConfirmation {
                section: EmploymentHistory,
                display_name: "Employment History",
                pending_target: Education,
            }
        );
        assert_eq!(draft.active_section(), EmploymentHistory);

        let step = nav.confirm_skip(&mut draft).unwrap();
        assert_eq!(step, NextStep::Proceed { target: Education });
        let NextStep::Proceed { target } = step else { unreachable!() };
        nav.commit(&mut draft, target);

        assert!(draft.is_skipped(EmploymentHistory));
        assert_eq!(draft.section(EmploymentHistory), &SectionValue::EmploymentHistory(vec![]));
        assert_eq!(draft.active_section(), Education);
        assert_eq!(nav.state(), NavState::Idle);
    }

    #[test]
    fn test_outcome_wire_format() {
        let json = serde_json::to_value(NavigationOutcome::AwaitingConfirmation {
            section: Projects,
            display_name: "Projects",
            pending_target: Languages,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "outcome": "awaiting_confirmation",
                "section": "projects",
                "display_name": "Projects",
                "pending_target": "languages"
            })
        );
    }
}
