// Prompts for summary/description generation and resume parsing.
// Reuses cross-cutting fragments from llm_client::prompts.

use std::fmt::Write;

use crate::document::value::{EducationEntry, EmploymentEntry, ProjectEntry};
use crate::document::{SectionKind, SectionSet, SectionValue};
use crate::generation::DescriptionContext;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_TEXT_INSTRUCTION};

pub const SUMMARY_SYSTEM: &str = "You are a professional resume writer. \
    Generate compelling professional summaries that highlight a candidate's strengths and experience.";

pub const DESCRIPTION_SYSTEM: &str =
    "You are a professional resume writer. Generate concise, impactful descriptions for resumes.";

pub const SUMMARY_MAX_TOKENS: u32 = 200;
pub const DESCRIPTION_MAX_TOKENS: u32 = 300;

pub fn parse_system() -> String {
    format!("You are a precise resume parser. {JSON_ONLY_SYSTEM}")
}

/// Resume parsing prompt template. Replace `{resume_text}` before sending.
pub const PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured information from the following resume text and return it as a JSON object. Be thorough and extract all available information.

Expected JSON structure:
{
  "personal_details": {
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "phone number",
    "address": "full address",
    "city": "city",
    "state": "state",
    "zip": "zip code",
    "country": "country"
  },
  "professional_summary": "Professional summary or objective statement",
  "employment_history": [
    {
      "company_name": "Company Name",
      "position": "Job Title",
      "start_date": "YYYY-MM",
      "end_date": "YYYY-MM or Present",
      "description": "Job responsibilities and achievements",
      "type": "full-time | part-time | freelance | internship | volunteer"
    }
  ],
  "education": [
    {
      "school_name": "School Name",
      "degree": "Degree",
      "field_of_study": "Field of Study",
      "start_date": "YYYY-MM",
      "end_date": "YYYY-MM",
      "description": "Additional details"
    }
  ],
  "projects": [
    {
      "project_name": "Project Name",
      "description": "Project description",
      "technologies": ["tech1", "tech2"],
      "links": {"github": "url", "demo": "url"}
    }
  ],
  "skills": ["skill1", "skill2"],
  "languages": [{"language": "English", "proficiency": "Native | Fluent | Intermediate | Basic"}],
  "links": {"linkedin": "url", "github": "url", "portfolio": "url"}
}

Rules:
- Only include fields that are present in the resume. Use null for sections that are missing.
- Dates use the YYYY-MM format.
- Do not make up information.
- Extract ALL work experience, education, projects and skills.

Resume text:
{resume_text}"#;

pub fn parse_prompt(resume_text: &str) -> String {
    PARSE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

/// Plain-text digest of the resume used as context for summary generation.
pub fn summary_context(sections: &SectionSet) -> String {
    let mut out = String::new();

    let pd = sections.personal_details();
    let or_na = |s: &str| if s.trim().is_empty() { "N/A".to_string() } else { s.to_string() };
    let _ = writeln!(out, "Personal Information:");
    let _ = writeln!(out, "- Name: {}", or_na(&pd.name));
    let _ = writeln!(out, "- Email: {}", or_na(&pd.email));
    if let Some(phone) = &pd.phone {
        let _ = writeln!(out, "- Phone: {phone}");
    }
    if let (Some(city), Some(state)) = (&pd.city, &pd.state) {
        let _ = writeln!(out, "- Location: {city}, {state}");
    }
    out.push('\n');

    for value in SectionKind::ALL.map(|k| sections.get(k)) {
        match value {
            SectionValue::Skills(skills) if !skills.is_empty() => {
                let _ = writeln!(out, "Skills: {}\n", skills.join(", "));
            }
            SectionValue::EmploymentHistory(jobs) if !jobs.is_empty() => {
                let _ = writeln!(out, "Work Experience:");
                for (i, job) in jobs.iter().enumerate() {
                    let _ = write!(out, "{}. {} at {}", i + 1, or_na(&job.position), or_na(&job.company_name));
                    if !job.start_date.is_empty() {
                        let end = job.end_date.as_deref().unwrap_or("Present");
                        let _ = write!(out, " ({} - {end})", job.start_date);
                    }
                    out.push('\n');
                    if let Some(description) = &job.description {
                        let _ = writeln!(out, "   {description}");
                    }
                }
                out.push('\n');
            }
            SectionValue::Education(schools) if !schools.is_empty() => {
                let _ = writeln!(out, "Education:");
                for (i, edu) in schools.iter().enumerate() {
                    let _ = write!(
                        out,
                        "{}. {} in {} from {}",
                        i + 1,
                        or_na(&edu.degree),
                        or_na(&edu.field_of_study),
                        or_na(&edu.school_name)
                    );
                    if !edu.start_date.is_empty() {
                        match &edu.end_date {
                            Some(end) => {
                                let _ = write!(out, " ({} - {end})", edu.start_date);
                            }
                            None => {
                                let _ = write!(out, " ({})", edu.start_date);
                            }
                        }
                    }
                    out.push('\n');
                    if let Some(description) = &edu.description {
                        let _ = writeln!(out, "   {description}");
                    }
                }
                out.push('\n');
            }
            SectionValue::Projects(projects) if !projects.is_empty() => {
                let _ = writeln!(out, "Projects:");
                for (i, project) in projects.iter().enumerate() {
                    let _ = write!(out, "{}. {}", i + 1, or_na(&project.project_name));
                    if !project.technologies.is_empty() {
                        let _ = write!(out, " (Technologies: {})", project.technologies.join(", "));
                    }
                    out.push('\n');
                    if !project.description.is_empty() {
                        let _ = writeln!(out, "   {}", project.description);
                    }
                }
                out.push('\n');
            }
            SectionValue::Languages(languages) if !languages.is_empty() => {
                let listed: Vec<String> = languages
                    .iter()
                    .map(|l| format!("{} ({})", l.language, l.proficiency))
                    .collect();
                let _ = writeln!(out, "Languages: {}\n", listed.join(", "));
            }
            _ => {}
        }
    }
    out
}

pub fn summary_prompt(sections: &SectionSet) -> String {
    format!(
        "Based on the following resume information, generate a professional summary (2-4 sentences) \
        that highlights the candidate's key qualifications, experience, and strengths.\n\n\
        {}\n\
        The summary should:\n\
        - Highlight key qualifications and experience\n\
        - Mention relevant skills and expertise\n\
        - Show career progression or focus\n\
        - Be concise (2-4 sentences)\n\n\
        {PLAIN_TEXT_INSTRUCTION}",
        summary_context(sections)
    )
}

fn employment_prompt(job: &EmploymentEntry) -> String {
    let kind = job
        .employment_type
        .and_then(|t| serde_json::to_value(t).ok())
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| "full-time".to_string());
    format!(
        "Generate a professional job description for a resume based on the following information:\n\
        - Company: {}\n\
        - Position: {}\n\
        - Start Date: {}\n\
        - End Date: {}\n\
        - Type: {kind}\n\n\
        Generate 3-5 bullet points describing key responsibilities and achievements.",
        job.company_name,
        job.position,
        job.start_date,
        job.end_date.as_deref().unwrap_or("Present"),
    )
}

fn education_prompt(edu: &EducationEntry) -> String {
    format!(
        "Generate a professional education description for a resume based on the following information:\n\
        - School: {}\n\
        - Degree: {}\n\
        - Field of Study: {}\n\
        - Start Date: {}\n\
        - End Date: {}\n\n\
        Generate 2-3 sentences describing relevant coursework, achievements, or highlights.",
        edu.school_name,
        edu.degree,
        edu.field_of_study,
        edu.start_date,
        edu.end_date.as_deref().unwrap_or("N/A"),
    )
}

fn project_prompt(project: &ProjectEntry) -> String {
    let technologies = if project.technologies.is_empty() {
        "N/A".to_string()
    } else {
        project.technologies.join(", ")
    };
    format!(
        "Generate a professional project description for a resume based on the following information:\n\
        - Project Name: {}\n\
        - Technologies: {technologies}\n\n\
        Generate 3-4 sentences describing the project, its purpose, key features, and technologies used.",
        project.project_name,
    )
}

pub fn description_prompt(context: &DescriptionContext) -> String {
    let body = match context {
        DescriptionContext::EmploymentHistory(job) => employment_prompt(job),
        DescriptionContext::Education(edu) => education_prompt(edu),
        DescriptionContext::Projects(project) => project_prompt(project),
    };
    format!("{body}\n\n{PLAIN_TEXT_INSTRUCTION}")
}
