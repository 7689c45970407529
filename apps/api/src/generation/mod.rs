// AI writing assistance: summary and description generation, and parsing
// uploaded resume text into sections.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod handlers;
pub mod prompts;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::section::ValueShape;
use crate::document::value::{shape_mismatch, EducationEntry, EmploymentEntry, ProjectEntry};
use crate::document::{PartialDocument, SectionKind, SectionSet, SectionValue};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model output could not be used: {0}")]
    Unusable(String),
}

/// The entry a description is written for. Only list sections with a
/// free-text description field can be described.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionContext {
    EmploymentHistory(EmploymentEntry),
    Education(EducationEntry),
    Projects(ProjectEntry),
}

#[derive(Debug, Error)]
pub enum DescriptionContextError {
    #[error("Descriptions cannot be generated for section '{0}'")]
    UnsupportedSection(SectionKind),

    #[error("Invalid context for section '{kind}': {source}")]
    Shape {
        kind: SectionKind,
        #[source]
        source: serde_json::Error,
    },
}

impl DescriptionContext {
    pub fn from_json(kind: SectionKind, context: Value) -> Result<Self, DescriptionContextError> {
        let shape = |source| DescriptionContextError::Shape { kind, source };
        if kind.shape() == ValueShape::ObjectList && !context.is_object() {
            return Err(shape(shape_mismatch(&context, "an entry object")));
        }
        match kind {
            SectionKind::EmploymentHistory => serde_json::from_value(context)
                .map(DescriptionContext::EmploymentHistory)
                .map_err(shape),
            SectionKind::Education => serde_json::from_value(context)
                .map(DescriptionContext::Education)
                .map_err(shape),
            SectionKind::Projects => serde_json::from_value(context)
                .map(DescriptionContext::Projects)
                .map_err(shape),
            other => Err(DescriptionContextError::UnsupportedSection(other)),
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            DescriptionContext::EmploymentHistory(_) => SectionKind::EmploymentHistory,
            DescriptionContext::Education(_) => SectionKind::Education,
            DescriptionContext::Projects(_) => SectionKind::Projects,
        }
    }
}

/// Text generation backend. Carried in `AppState` as `Arc<dyn TextGenerationService>`.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate_summary(&self, sections: &SectionSet) -> Result<String, GenerationError>;

    async fn generate_description(&self, context: &DescriptionContext) -> Result<String, GenerationError>;

    /// Extracts whatever sections the text contains. Sections the model returns
    /// in the wrong shape are dropped.
    async fn parse_document(&self, raw_text: &str) -> Result<PartialDocument, GenerationError>;
}

pub struct LlmTextGenerator {
    llm: LlmClient,
}

impl LlmTextGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TextGenerationService for LlmTextGenerator {
    async fn generate_summary(&self, sections: &SectionSet) -> Result<String, GenerationError> {
        let prompt = prompts::summary_prompt(sections);
        let summary = self
            .llm
            .call_text(&prompt, prompts::SUMMARY_SYSTEM, prompts::SUMMARY_MAX_TOKENS)
            .await?;
        debug!("Generated summary ({} chars)", summary.len());
        Ok(summary)
    }

    async fn generate_description(&self, context: &DescriptionContext) -> Result<String, GenerationError> {
        let prompt = prompts::description_prompt(context);
        let description = self
            .llm
            .call_text(&prompt, prompts::DESCRIPTION_SYSTEM, prompts::DESCRIPTION_MAX_TOKENS)
            .await?;
        debug!("Generated {} description", context.kind());
        Ok(description)
    }

    async fn parse_document(&self, raw_text: &str) -> Result<PartialDocument, GenerationError> {
        let prompt = prompts::parse_prompt(raw_text);
        let parsed: Value = self.llm.call_json(&prompt, &prompts::parse_system()).await?;
        if !parsed.is_object() {
            return Err(GenerationError::Unusable(
                "expected a JSON object of sections".to_string(),
            ));
        }
        let (document, rejected) = PartialDocument::from_json(&parsed);
        for e in rejected {
            warn!("Parsed resume: {e}");
        }
        Ok(document)
    }
}

/// Whether the draft holds anything besides a summary to write a summary from.
pub fn has_summary_material(sections: &SectionSet) -> bool {
    SectionKind::ALL
        .into_iter()
        .filter(|k| *k != SectionKind::ProfessionalSummary)
        .any(|k| match sections.get(k) {
            SectionValue::PersonalDetails(pd) => !pd.name.trim().is_empty(),
            other => !other.is_empty(),
        })
}
