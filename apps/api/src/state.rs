use std::sync::Arc;

use crate::cv::docwriter::DocumentWriter;
use crate::errors::AppError;
use crate::jobs::dataset::JobDataset;
use crate::jobs::matcher::MatcherWeights;
use crate::llm_client::LlmClient;
use crate::media::ocr::VisionClient;
use crate::media::speech::SpeechClient;
use crate::media::tts::TtsClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. The only cross-request data is read-only: the job dataset is
/// written once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// LLM client; `None` when no API key is configured.
    pub llm: Option<LlmClient>,
    /// Job dataset, loaded once at startup.
    pub jobs: Arc<JobDataset>,
    /// Matcher scoring constants, carried as injected configuration.
    pub matcher: Arc<MatcherWeights>,
    pub vision: Option<VisionClient>,
    pub speech: Option<SpeechClient>,
    pub tts: Option<TtsClient>,
    /// Document assembly seam for the DOCX endpoint.
    pub doc_writer: Arc<dyn DocumentWriter>,
}

impl AppState {
    pub fn require_llm(&self) -> Result<&LlmClient, AppError> {
        self.llm.as_ref().ok_or_else(|| {
            AppError::ServiceNotConfigured(
                "language model is not configured; set ANTHROPIC_API_KEY on the server".to_string(),
            )
        })
    }

    pub fn require_vision(&self) -> Result<&VisionClient, AppError> {
        self.vision.as_ref().ok_or_else(|| {
            AppError::ServiceNotConfigured(
                "OCR is not configured; set GOOGLE_VISION_API_KEY or GOOGLE_API_KEY on the server"
                    .to_string(),
            )
        })
    }

    pub fn require_speech(&self) -> Result<&SpeechClient, AppError> {
        self.speech.as_ref().ok_or_else(|| {
            AppError::ServiceNotConfigured(
                "speech recognition is not configured; set GOOGLE_SPEECH_API_KEY or GOOGLE_API_KEY on the server"
                    .to_string(),
            )
        })
    }

    pub fn require_tts(&self) -> Result<&TtsClient, AppError> {
        self.tts.as_ref().ok_or_else(|| {
            AppError::ServiceNotConfigured(
                "speech synthesis is not configured; set GOOGLE_TTS_API_KEY or GOOGLE_API_KEY on the server"
                    .to_string(),
            )
        })
    }
}
