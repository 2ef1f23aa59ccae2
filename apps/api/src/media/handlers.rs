//! Axum route handlers for the media endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// Uploads below this size cannot contain usable speech.
const MIN_AUDIO_BYTES: usize = 1000;

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub audio_base64: String,
    pub format: &'static str,
}

fn default_language() -> String {
    "en-US".to_string()
}

/// POST /api/media/ocr (multipart: `file`)
///
/// Runs the upload through the OCR adapter; the adapter dispatches on the
/// declared content type and reports unsupported types explicitly.
pub async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, AppError> {
    let vision = state.require_vision()?;
    let (content, mime_type) = read_file_field(&mut multipart, "file").await?;
    let text = vision.extract_text(content, &mime_type).await?;
    Ok(Json(OcrResponse { text }))
}

/// POST /api/media/transcribe (multipart: `audio` + optional `language`)
pub async fn handle_transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let speech = state.require_speech()?;

    let mut audio: Option<Bytes> = None;
    let mut language = default_language();
    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => audio = Some(field.bytes().await.map_err(invalid_multipart)?),
            Some("language") => language = field.text().await.map_err(invalid_multipart)?,
            _ => {}
        }
    }

    let audio = audio
        .ok_or_else(|| AppError::Validation("missing multipart field 'audio'".to_string()))?;
    if audio.len() < MIN_AUDIO_BYTES {
        return Err(AppError::Validation("audio file too short".to_string()));
    }

    let transcript = speech.transcribe(audio, &language).await?;
    Ok(Json(TranscribeResponse { transcript }))
}

/// POST /api/media/speak
pub async fn handle_speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> Result<Json<SpeakResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let tts = state.require_tts()?;
    let audio_base64 = tts.synthesize(&request.text, &request.language).await?;
    Ok(Json(SpeakResponse {
        audio_base64,
        format: "mp3",
    }))
}

/// Pulls the named file field out of a multipart body, with its declared
/// content type.
async fn read_file_field(
    multipart: &mut Multipart,
    name: &str,
) -> Result<(Bytes, String), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        if field.name() != Some(name) {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field.bytes().await.map_err(invalid_multipart)?;
        return Ok((content, mime_type));
    }
    Err(AppError::Validation(format!(
        "missing multipart field '{name}'"
    )))
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("invalid multipart body: {e}"))
}
