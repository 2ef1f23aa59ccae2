//! Axum route handlers for the coaching endpoints.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::coaching::prompts::{
    EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM, QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM,
};
use crate::errors::AppError;
use crate::extractor::{extract, ExtractedPayload, TargetShape};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub field: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// POST /api/evaluate
///
/// Evaluates a typed (or transcribed) interview answer. The reply is always
/// a tagged payload — an evaluation or a general answer. Malformed model
/// output degrades through the extractor's fallback ladder instead of
/// surfacing a parse error.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<ExtractedPayload>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let llm = state.require_llm()?;
    let prompt = EVALUATION_PROMPT_TEMPLATE.replace("{user_answer}", &request.prompt);
    let reply = llm.complete(&prompt, EVALUATION_SYSTEM).await?;

    let extraction = extract(&reply, TargetShape::TaggedObject)?;
    if let Some(reason) = extraction.fallback {
        tracing::debug!("evaluation reply degraded through fallback: {reason:?}");
    }
    Ok(Json(extraction.payload))
}

/// POST /api/questions/generate
///
/// Generates tagged interview questions for a profile. List-shaped replies
/// are extracted strictly: an unusable reply surfaces a diagnostic error
/// carrying a raw-text excerpt.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<Json<ExtractedPayload>, AppError> {
    if request.field.trim().is_empty() {
        return Err(AppError::Validation("field cannot be empty".to_string()));
    }

    let llm = state.require_llm()?;

    let skills_text = if request.skills.is_empty() {
        "general professional skills".to_string()
    } else {
        request.skills.join(", ")
    };
    let role_text = if request.role.trim().is_empty() {
        request.field.clone()
    } else {
        request.role.clone()
    };

    let prompt = QUESTIONS_PROMPT_TEMPLATE
        .replace("{role}", &role_text)
        .replace("{field}", &request.field)
        .replace("{skills}", &skills_text);
    let reply = llm.complete(&prompt, QUESTIONS_SYSTEM).await?;

    let extraction = extract(&reply, TargetShape::StringArray)?;
    Ok(Json(extraction.payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;

    use super::*;
    use crate::cv::docwriter::DocxWriter;
    use crate::jobs::dataset::JobDataset;
    use crate::jobs::matcher::MatcherWeights;

    fn unconfigured_state() -> AppState {
        AppState {
            llm: None,
            jobs: Arc::new(JobDataset::default()),
            matcher: Arc::new(MatcherWeights::default()),
            vision: None,
            speech: None,
            tts: None,
            doc_writer: Arc::new(DocxWriter),
        }
    }

    #[tokio::test]
    async fn test_evaluate_empty_prompt_rejected_before_llm() {
        let request = EvaluateRequest {
            prompt: "   ".to_string(),
        };
        let err = handle_evaluate(State(unconfigured_state()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_without_llm_is_service_not_configured() {
        let request = EvaluateRequest {
            prompt: "I led a migration project.".to_string(),
        };
        let err = handle_evaluate(State(unconfigured_state()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_questions_empty_field_rejected() {
        let request = GenerateQuestionsRequest {
            field: "".to_string(),
            role: String::new(),
            skills: vec![],
        };
        let err = handle_generate_questions(State(unconfigured_state()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
