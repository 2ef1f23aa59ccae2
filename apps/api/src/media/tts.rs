//! Text-to-speech adapter — Google Cloud Text-to-Speech REST API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::media::MediaError;

const TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Speaking parameters tuned for coaching playback: slightly slow, slightly
/// low-pitched.
const SPEAKING_RATE: f64 = 0.85;
const PITCH: f64 = -2.0;
const VOLUME_GAIN_DB: f64 = 0.0;

/// Voice per language family. Everything outside the Vietnamese family
/// defaults to the English voice — voice selection is a default-path
/// dispatch, not a validation surface.
fn select_voice(language: &str) -> (&'static str, &'static str) {
    match language.to_lowercase().as_str() {
        "vi" | "vi-vn" | "vietnamese" => ("vi-VN", "vi-VN-Neural2-A"),
        _ => ("en-US", "en-US-Neural2-F"),
    }
}

#[derive(Clone)]
pub struct TtsClient {
    client: Client,
    api_key: String,
}

impl TtsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Synthesizes speech as MP3. Returns base64 audio exactly as produced
    /// by the upstream API.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<String, MediaError> {
        let (language_code, voice_name) = select_voice(language);
        debug!("Synthesizing {} chars with voice {voice_name}", text.len());

        let body = json!({
            "input": { "text": text },
            "voice": {
                "languageCode": language_code,
                "name": voice_name,
                "ssmlGender": "FEMALE",
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": SPEAKING_RATE,
                "pitch": PITCH,
                "volumeGainDb": VOLUME_GAIN_DB,
            },
        });

        let url = format!("{TTS_API_URL}?key={}", self.api_key);
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
                service: "text-to-speech",
                message: format!("status {status}: {body}"),
            });
        }

        let parsed: SynthesizeResponse = response.json().await.map_err(upstream)?;
        if parsed.audio_content.is_empty() {
            return Err(MediaError::Upstream {
                service: "text-to-speech",
                message: "empty audio content".to_string(),
            });
        }
        Ok(parsed.audio_content)
    }
}

fn upstream(e: reqwest::Error) -> MediaError {
    MediaError::Upstream {
        service: "text-to-speech",
        message: e.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vietnamese_family_selects_vietnamese_voice() {
        for code in ["vi", "vi-VN", "Vietnamese"] {
            assert_eq!(select_voice(code), ("vi-VN", "vi-VN-Neural2-A"));
        }
    }

    #[test]
    fn test_everything_else_defaults_to_english_voice() {
        for code in ["en", "en-US", "fr-FR", ""] {
            assert_eq!(select_voice(code), ("en-US", "en-US-Neural2-F"));
        }
    }

    #[test]
    fn test_synthesize_response_reads_camel_case() {
        let parsed: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "bW9jaw=="}"#).unwrap();
        assert_eq!(parsed.audio_content, "bW9jaw==");
    }
}
