//! The resume document model: sections, ordering, validation, the editable
//! draft and the navigation state machine that walks it.

pub mod customization;
pub mod draft;
pub mod export;
pub mod navigation;
pub mod order;
pub mod section;
pub mod validation;
pub mod value;

pub use customization::Customization;
pub use draft::{Origin, ResumeDraft, ResumeSnapshot};
pub use section::SectionKind;
pub use value::{PartialDocument, SectionSet, SectionValue};
