// All LLM prompt constants for the CV module.
// Reuses the cross-cutting JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for CV analysis — advisor persona + JSON-only contract.
pub fn analysis_system() -> String {
    format!("You are an expert career advisor and resume analyst. {JSON_ONLY_SYSTEM}")
}

/// CV analysis prompt template.
/// Replace `{cv_text}`, `{role}`, `{organization}` before sending.
pub const CV_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume text and extract comprehensive insights.

CV TEXT:
{cv_text}

TARGET ROLE (if any): {role}
TARGET ORGANIZATION (if any): {organization}

Provide a detailed analysis as a JSON object with exactly this structure:
{
  "extracted_role": "The main role/position based on the CV (e.g. 'Software Engineer', 'Marketing Manager')",
  "skills": ["skill1", "skill2", "skill3"],
  "experience_years": "Estimated years of experience",
  "experience_summary": "A brief summary of the work experience",
  "education": "Educational background",
  "strengths": ["strength1", "strength2"],
  "weaknesses": ["weakness1", "weakness2"],
  "learning_path": {
    "immediate": ["skills or areas to learn immediately"],
    "short_term": ["skills for the next 3-6 months"],
    "long_term": ["skills for 6-12 months"]
  },
  "recommended_tasks": ["task 1", "task 2"]
}

Return ONLY the JSON object, no additional text."#;

/// System prompt for markdown CV generation. Plain prose output — the reply
/// is not JSON, so no extractor involvement downstream.
pub const CV_MARKDOWN_SYSTEM: &str = "You are an expert CV/resume writer.";

/// Markdown CV template. Replace `{role}`, `{skills}`, `{experience}`,
/// `{education}`, `{achievements}` before sending.
pub const CV_MARKDOWN_PROMPT_TEMPLATE: &str = r#"Create a professional CV in Markdown format for a candidate with the following profile:

ROLE: {role}
SKILLS: {skills}
EXPERIENCE: {experience}
EDUCATION: {education}
ACHIEVEMENTS:
{achievements}

Generate a complete, professional CV in Markdown format with the following sections:
- Header with name and contact (use placeholders)
- Professional Summary
- Skills
- Work Experience
- Education
- Achievements
- Additional relevant sections

Make it ATS-friendly and professional. Use proper Markdown formatting.
Return ONLY the Markdown content, no JSON, no code blocks."#;

/// Plain-text CV template for DOCX export. Same placeholders as the
/// markdown template; section headers drive the document line classifier.
pub const CV_PLAIN_PROMPT_TEMPLATE: &str = r#"Create a professional CV for a candidate with the following profile:

ROLE: {role}
SKILLS: {skills}
EXPERIENCE: {experience}
EDUCATION: {education}
ACHIEVEMENTS:
{achievements}

Generate a complete, professional CV with the following sections:
- Header with [Your Full Name] and contact placeholders
- Professional Summary (2-3 sentences)
- Skills (list format)
- Work Experience (with job titles, companies, dates, responsibilities)
- Education
- Achievements

Make it ATS-friendly and professional. Use clear section headers.
Return plain text content, no markdown syntax, no code blocks."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_template_substitutes_fields() {
        let prompt = CV_ANALYSIS_PROMPT_TEMPLATE
            .replace("{cv_text}", "Ten years of plumbing.")
            .replace("{role}", "unspecified")
            .replace("{organization}", "unspecified");
        assert!(prompt.contains("Ten years of plumbing."));
        assert!(prompt.contains("TARGET ROLE (if any): unspecified"));
    }

    #[test]
    fn test_analysis_template_keeps_schema_braces() {
        // The JSON schema braces in the template must survive substitution.
        let prompt = CV_ANALYSIS_PROMPT_TEMPLATE.replace("{cv_text}", "text");
        assert!(prompt.contains("\"learning_path\""));
        assert!(prompt.contains("\"recommended_tasks\""));
    }

    #[test]
    fn test_analysis_system_is_json_only() {
        assert!(analysis_system().contains("valid JSON only"));
    }
}
