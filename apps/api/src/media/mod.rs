// Media adapters: thin request/response translators over the cloud
// vision/speech services, selected by MIME type or language code.

pub mod handlers;
pub mod ocr;
pub mod speech;
pub mod tts;

use thiserror::Error;

/// Failure contract shared by all media adapters. Converted to the HTTP
/// error taxonomy at the handler boundary — an unsupported discriminator is
/// a distinct, reported failure, never a silent empty result.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported content type '{mime}' (supported: {supported})")]
    UnsupportedType {
        mime: String,
        supported: &'static str,
    },

    #[error("unsupported language '{language}' (supported: {supported})")]
    UnsupportedLanguage {
        language: String,
        supported: &'static str,
    },

    #[error("{service} call failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("no speech detected in audio")]
    NoSpeech,
}

/// Runs base64 encoding of an upload on the blocking pool — payloads can be
/// megabytes and the encode would otherwise stall the I/O scheduler.
pub(crate) async fn encode_payload(content: bytes::Bytes) -> Result<String, MediaError> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    tokio::task::spawn_blocking(move || STANDARD.encode(&content))
        .await
        .map_err(|e| MediaError::Upstream {
            service: "encoder",
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_encode_payload_is_standard_base64() {
        let encoded = encode_payload(bytes::Bytes::from_static(b"hello")).await.unwrap();
        assert_eq!(encoded, "aGVsbG8=");
    }
}
