//! Resume import: pulling plain text out of uploaded files.
//!
//! Parsing that text into sections is the generator's job; the parsed result is
//! staged through the persistence gateway and adopted on the next editor load.

pub mod handlers;

use thiserror::Error;
use tracing::debug;

/// Uploads yielding less trimmed text than this are rejected.
pub const MIN_EXTRACTED_CHARS: usize = 50;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Pdf,
    Docx,
    PlainText,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type. Please upload PDF or DOCX.")]
    UnsupportedFormat,

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8")]
    Encoding,

    #[error("Could not extract enough text from the file.")]
    TooShort,
}

impl UploadFormat {
    /// Decides the format from the declared content type, then the file name.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let file_name = file_name.unwrap_or_default().to_lowercase();
        match content_type.unwrap_or_default() {
            PDF_MIME => return Some(UploadFormat::Pdf),
            DOCX_MIME => return Some(UploadFormat::Docx),
            "text/plain" => return Some(UploadFormat::PlainText),
            _ => {}
        }
        if file_name.ends_with(".pdf") {
            Some(UploadFormat::Pdf)
        } else if file_name.ends_with(".docx") {
            Some(UploadFormat::Docx)
        } else if file_name.ends_with(".txt") {
            Some(UploadFormat::PlainText)
        } else {
            None
        }
    }
}

/// Extracts text from an upload. CPU-bound; call from a blocking task.
pub fn extract_text(format: UploadFormat, data: &[u8]) -> Result<String, ExtractionError> {
    let text = match format {
        UploadFormat::Pdf => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))?
        }
        UploadFormat::Docx => extract_docx(data)?,
        UploadFormat::PlainText => {
            String::from_utf8(data.to_vec()).map_err(|_| ExtractionError::Encoding)?
        }
    };
    let length = text.trim().chars().count();
    debug!("Extracted {length} characters from {format:?} upload");
    if length < MIN_EXTRACTED_CHARS {
        return Err(ExtractionError::TooShort);
    }
    Ok(text)
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    let docx = read_docx(data).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
        .map(|paragraph| {
            paragraph
                .children
                .iter()
                .filter_map(|child| match child {
                    ParagraphChild::Run(run) => Some(run),
                    _ => None,
                })
                .flat_map(|run| run.children.iter())
                .filter_map(|child| match child {
                    RunChild::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .collect();
    Ok(paragraphs.join("\n"))
}
