use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extractor::ExtractionFailure;
use crate::llm_client::LlmError;
use crate::media::MediaError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every collaborator fault is converted into one of these variants at the
/// component boundary — no raw internal error ever reaches a caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Service not configured: {0}")]
    ServiceNotConfigured(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed upstream response: {message}")]
    MalformedUpstream { message: String, raw: String },

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("Job dataset unavailable")]
    DatasetUnavailable,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Upstream(format!("language model call failed: {err}"))
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType { .. } | MediaError::UnsupportedLanguage { .. } => {
                AppError::UnsupportedMedia(err.to_string())
            }
            MediaError::NoSpeech => AppError::UnprocessableEntity(err.to_string()),
            MediaError::Upstream { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

impl From<ExtractionFailure> for AppError {
    fn from(err: ExtractionFailure) -> Self {
        let raw = err.raw_excerpt().to_string();
        AppError::MalformedUpstream {
            message: err.to_string(),
            raw,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, raw) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
                None,
            ),
            AppError::ServiceNotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_NOT_CONFIGURED",
                msg.clone(),
                None,
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An upstream service call failed".to_string(),
                    None,
                )
            }
            AppError::MalformedUpstream { message, raw } => {
                tracing::error!("Malformed upstream response: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_UPSTREAM",
                    message.clone(),
                    Some(raw.clone()),
                )
            }
            AppError::UnsupportedMedia(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA",
                msg.clone(),
                None,
            ),
            AppError::DatasetUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATASET_UNAVAILABLE",
                "Job data is not available on the server".to_string(),
                None,
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(raw) = raw {
            body["error"]["raw"] = json!(raw);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_service_not_configured_maps_to_503() {
        let response = AppError::ServiceNotConfigured("no key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_dataset_unavailable_maps_to_503() {
        let response = AppError::DatasetUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unsupported_media_maps_to_415() {
        let response = AppError::UnsupportedMedia("text/csv".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_malformed_upstream_maps_to_502() {
        let response = AppError::MalformedUpstream {
            message: "no JSON array found".to_string(),
            raw: "some raw text".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_media_unsupported_type_converts_to_unsupported_media() {
        let err: AppError = MediaError::UnsupportedType {
            mime: "text/csv".to_string(),
            supported: "PDF, PNG",
        }
        .into();
        assert!(matches!(err, AppError::UnsupportedMedia(_)));
    }

    #[test]
    fn test_media_no_speech_converts_to_unprocessable() {
        let err: AppError = MediaError::NoSpeech.into();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
