//! Speech-to-text adapter — Google Cloud Speech REST API.

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::media::{encode_payload, MediaError};

const SPEECH_API_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";
const SUPPORTED_LANGUAGES: &str = "en, en-US, english, vi, vi-VN, vietnamese";

/// Maps a requested language code onto the cloud locale and model.
/// Vietnamese benefits from the enhanced long-form model.
pub(crate) fn resolve_language(language: &str) -> Result<(&'static str, &'static str), MediaError> {
    match language.to_lowercase().as_str() {
        "vi" | "vi-vn" | "vietnamese" => Ok(("vi-VN", "latest_long")),
        "en" | "en-us" | "english" => Ok(("en-US", "default")),
        _ => Err(MediaError::UnsupportedLanguage {
            language: language.to_string(),
            supported: SUPPORTED_LANGUAGES,
        }),
    }
}

#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    api_key: String,
}

impl SpeechClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Transcribes a browser-recorded audio clip (WebM/Opus, 48 kHz).
    pub async fn transcribe(&self, audio: Bytes, language: &str) -> Result<String, MediaError> {
        let (language_code, model) = resolve_language(language)?;
        debug!(
            "Transcribing {} bytes as {language_code} with model {model}",
            audio.len()
        );

        let encoded = encode_payload(audio).await?;
        let body = json!({
            "config": {
                "encoding": "WEBM_OPUS",
                "sampleRateHertz": 48000,
                "languageCode": language_code,
                "enableAutomaticPunctuation": true,
                "useEnhanced": true,
                "model": model,
            },
            "audio": { "content": encoded },
        });

        let url = format!("{SPEECH_API_URL}?key={}", self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Upstream {
                service: "speech",
                message: format!("status {status}: {body}"),
            });
        }

        let parsed: RecognizeResponse = response.json().await.map_err(upstream)?;
        join_transcript(&parsed)
    }
}

/// Joins per-segment top alternatives into one transcript. An empty result
/// set (or an all-blank transcript) is the distinct no-speech failure.
fn join_transcript(response: &RecognizeResponse) -> Result<String, MediaError> {
    if response.results.is_empty() {
        return Err(MediaError::NoSpeech);
    }

    let transcript = response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|a| a.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Err(MediaError::NoSpeech);
    }
    Ok(transcript.to_string())
}

fn upstream(e: reqwest::Error) -> MediaError {
    MediaError::Upstream {
        service: "speech",
        message: e.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vietnamese_codes_map_to_enhanced_model() {
        for code in ["vi", "VI-vn", "Vietnamese"] {
            assert_eq!(resolve_language(code).unwrap(), ("vi-VN", "latest_long"));
        }
    }

    #[test]
    fn test_english_codes_map_to_default_model() {
        for code in ["en", "en-US", "English"] {
            assert_eq!(resolve_language(code).unwrap(), ("en-US", "default"));
        }
    }

    #[test]
    fn test_unknown_language_is_reported() {
        let err = resolve_language("fr-FR").unwrap_err();
        match err {
            MediaError::UnsupportedLanguage {
                language,
                supported,
            } => {
                assert_eq!(language, "fr-FR");
                assert!(supported.contains("vi-VN"));
            }
            other => panic!("expected unsupported language, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_results_is_no_speech() {
        let response = RecognizeResponse { results: vec![] };
        assert!(matches!(
            join_transcript(&response),
            Err(MediaError::NoSpeech)
        ));
    }

    #[test]
    fn test_blank_transcript_is_no_speech() {
        let response = RecognizeResponse {
            results: vec![RecognitionResult {
                alternatives: vec![Alternative {
                    transcript: "   ".to_string(),
                }],
            }],
        };
        assert!(matches!(
            join_transcript(&response),
            Err(MediaError::NoSpeech)
        ));
    }

    #[test]
    fn test_segments_joined_with_spaces() {
        let response = RecognizeResponse {
            results: vec![
                RecognitionResult {
                    alternatives: vec![Alternative {
                        transcript: "hello".to_string(),
                    }],
                },
                RecognitionResult {
                    alternatives: vec![Alternative {
                        transcript: "world".to_string(),
                    }],
                },
            ],
        };
        assert_eq!(join_transcript(&response).unwrap(), "hello world");
    }
}
