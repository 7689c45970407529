//! Scripted text generator for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::document::{PartialDocument, SectionSet};
use crate::generation::{DescriptionContext, GenerationError, TextGenerationService};

#[derive(Default)]
pub struct ScriptedTextGenerator {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parsed: Option<PartialDocument>,
    pub last_raw_text: Mutex<Option<String>>,
}

fn failure() -> GenerationError {
    GenerationError::Unusable("scripted failure".to_string())
}

#[async_trait]
impl TextGenerationService for ScriptedTextGenerator {
    async fn generate_summary(&self, _sections: &SectionSet) -> Result<String, GenerationError> {
        self.summary.clone().ok_or_else(failure)
    }

    async fn generate_description(&self, _context: &DescriptionContext) -> Result<String, GenerationError> {
        self.description.clone().ok_or_else(failure)
    }

    async fn parse_document(&self, raw_text: &str) -> Result<PartialDocument, GenerationError> {
        if let Ok(mut last) = self.last_raw_text.lock() {
            *last = Some(raw_text.to_string());
        }
        self.parsed.clone().ok_or_else(failure)
    }
}
