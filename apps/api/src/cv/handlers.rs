//! Axum route handlers for the CV endpoints.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::cv::prompts::{
    analysis_system, CV_ANALYSIS_PROMPT_TEMPLATE, CV_MARKDOWN_PROMPT_TEMPLATE, CV_MARKDOWN_SYSTEM,
    CV_PLAIN_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::extractor::{extract, strip_code_fences, ExtractedPayload, TargetShape};
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOCX_FILENAME_HEADER: &str = "attachment; filename=CV_Generated.docx";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCvRequest {
    pub cv_text: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub organization: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateCvRequest {
    pub role: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCvResponse {
    pub markdown: String,
}

/// POST /api/cv/analyze
///
/// Extracts a structured analysis from free CV text. Strict extraction: an
/// unusable model reply surfaces a diagnostic error with a raw excerpt.
pub async fn handle_analyze_cv(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCvRequest>,
) -> Result<Json<ExtractedPayload>, AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cvText cannot be empty".to_string()));
    }

    let llm = state.require_llm()?;
    let prompt = CV_ANALYSIS_PROMPT_TEMPLATE
        .replace("{cv_text}", &request.cv_text)
        .replace("{role}", or_unspecified(&request.role))
        .replace("{organization}", or_unspecified(&request.organization));
    let reply = llm.complete(&prompt, &analysis_system()).await?;

    let extraction = extract(&reply, TargetShape::AnalysisObject)?;
    Ok(Json(extraction.payload))
}

/// POST /api/cv/generate
///
/// Generates a sample CV in markdown. The reply is prose, not JSON — only
/// stray code fences are stripped.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Json<GenerateCvResponse>, AppError> {
    validate_profile(&request)?;

    let llm = state.require_llm()?;
    let prompt = compose_profile_prompt(CV_MARKDOWN_PROMPT_TEMPLATE, &request);
    let reply = llm.complete(&prompt, CV_MARKDOWN_SYSTEM).await?;

    let markdown = strip_code_fences(&reply).to_string();
    Ok(Json(GenerateCvResponse { markdown }))
}

/// POST /api/cv/generate-doc
///
/// Same profile input, but the CV comes back as a binary DOCX attachment.
/// Document assembly is CPU-bound and runs on the blocking pool.
pub async fn handle_generate_cv_doc(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Response, AppError> {
    validate_profile(&request)?;

    let llm = state.require_llm()?;
    let prompt = compose_profile_prompt(CV_PLAIN_PROMPT_TEMPLATE, &request);
    let reply = llm.complete(&prompt, CV_MARKDOWN_SYSTEM).await?;
    let text = strip_code_fences(&reply).to_string();

    let writer = state.doc_writer.clone();
    let bytes = tokio::task::spawn_blocking(move || writer.render(&text))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("document assembly task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, DOCX_CONTENT_TYPE),
        (header::CONTENT_DISPOSITION, DOCX_FILENAME_HEADER),
    ];
    Ok((headers, bytes).into_response())
}

fn validate_profile(request: &GenerateCvRequest) -> Result<(), AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    Ok(())
}

fn compose_profile_prompt(template: &str, request: &GenerateCvRequest) -> String {
    let skills_list = request.skills.join(", ");
    let achievements_list = if request.achievements.is_empty() {
        "- [Add your achievements]".to_string()
    } else {
        request
            .achievements
            .iter()
            .map(|a| format!("- {a}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    template
        .replace("{role}", &request.role)
        .replace("{skills}", &skills_list)
        .replace("{experience}", &request.experience)
        .replace("{education}", &request.education)
        .replace("{achievements}", &achievements_list)
}

fn or_unspecified(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "unspecified"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerateCvRequest {
        GenerateCvRequest {
            role: "Backend Engineer".to_string(),
            skills: vec!["rust".to_string(), "sql".to_string()],
            experience: "4 years at Acme".to_string(),
            education: "BSc Computer Science".to_string(),
            achievements: vec![],
        }
    }

    #[test]
    fn test_compose_prompt_joins_skills() {
        let prompt = compose_profile_prompt(CV_MARKDOWN_PROMPT_TEMPLATE, &request());
        assert!(prompt.contains("SKILLS: rust, sql"));
        assert!(prompt.contains("ROLE: Backend Engineer"));
    }

    #[test]
    fn test_compose_prompt_placeholder_achievements() {
        let prompt = compose_profile_prompt(CV_MARKDOWN_PROMPT_TEMPLATE, &request());
        assert!(prompt.contains("- [Add your achievements]"));
    }

    #[test]
    fn test_compose_prompt_bullets_achievements() {
        let mut req = request();
        req.achievements = vec!["Shipped v2".to_string(), "Cut latency 40%".to_string()];
        let prompt = compose_profile_prompt(CV_PLAIN_PROMPT_TEMPLATE, &req);
        assert!(prompt.contains("- Shipped v2\n- Cut latency 40%"));
    }

    #[test]
    fn test_or_unspecified() {
        assert_eq!(or_unspecified("  "), "unspecified");
        assert_eq!(or_unspecified(" Acme "), "Acme");
    }
}
