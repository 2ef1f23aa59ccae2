//! OCR adapter — Google Cloud Vision REST API.
//!
//! Dispatches on the declared MIME type: document formats go through the
//! file-annotation path, plain images through image annotation. Anything
//! else is a reported unsupported-type failure.

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::media::{encode_payload, MediaError};

const VISION_API_URL: &str = "https://vision.googleapis.com/v1";
const SUPPORTED_TYPES: &str = "PDF, PNG, JPG, GIF, TIFF, DOCX";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME types routed through the document (file-annotation) path.
const DOCUMENT_TYPES: &[&str] = &["application/pdf", "image/tiff", "image/gif", DOCX_MIME];
/// MIME types routed through the image-annotation path.
const IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Returned as successful text when the page carries no annotation at all.
const NO_TEXT_FOUND: &str = "No text found in file.";

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Extracts document text from an uploaded file.
    pub async fn extract_text(&self, content: Bytes, mime_type: &str) -> Result<String, MediaError> {
        if DOCUMENT_TYPES.contains(&mime_type) {
            // Vision reads DOCX through its PDF input path.
            let submit_mime = if mime_type == DOCX_MIME {
                "application/pdf"
            } else {
                mime_type
            };
            debug!("OCR file annotation for {mime_type} (submitted as {submit_mime})");
            self.annotate_file(content, submit_mime).await
        } else if IMAGE_TYPES.contains(&mime_type) {
            debug!("OCR image annotation for {mime_type}");
            self.annotate_image(content).await
        } else {
            Err(MediaError::UnsupportedType {
                mime: mime_type.to_string(),
                supported: SUPPORTED_TYPES,
            })
        }
    }

    async fn annotate_file(&self, content: Bytes, mime_type: &str) -> Result<String, MediaError> {
        let encoded = encode_payload(content).await?;
        let body = json!({
            "requests": [{
                "inputConfig": { "content": encoded, "mimeType": mime_type },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self.post("files:annotate", body).await?;
        let parsed: FileAnnotateResponse = response.json().await.map_err(upstream)?;

        let page = parsed
            .responses
            .into_iter()
            .next()
            .and_then(|file| file.responses.into_iter().next())
            .ok_or(MediaError::Upstream {
                service: "vision",
                message: "empty annotation response".to_string(),
            })?;
        page_text(page)
    }

    async fn annotate_image(&self, content: Bytes) -> Result<String, MediaError> {
        let encoded = encode_payload(content).await?;
        let body = json!({
            "requests": [{
                "image": { "content": encoded },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self.post("images:annotate", body).await?;
        let parsed: ImageAnnotateResponse = response.json().await.map_err(upstream)?;

        let page = parsed
            .responses
            .into_iter()
            .next()
            .ok_or(MediaError::Upstream {
                service: "vision",
                message: "empty annotation response".to_string(),
            })?;
        page_text(page)
    }

    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, MediaError> {
        let url = format!("{VISION_API_URL}/{method}?key={}", self.api_key);
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
                service: "vision",
                message: format!("status {status}: {body}"),
            });
        }
        Ok(response)
    }
}

fn upstream(e: reqwest::Error) -> MediaError {
    MediaError::Upstream {
        service: "vision",
        message: e.to_string(),
    }
}

fn page_text(page: PageResponse) -> Result<String, MediaError> {
    if let Some(error) = page.error {
        return Err(MediaError::Upstream {
            service: "vision",
            message: error.message,
        });
    }
    Ok(page
        .full_text_annotation
        .map(|a| a.text)
        .unwrap_or_else(|| NO_TEXT_FOUND.to_string()))
}

#[derive(Debug, Deserialize)]
struct FileAnnotateResponse {
    #[serde(default)]
    responses: Vec<FileResponse>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(default)]
    responses: Vec<PageResponse>,
}

#[derive(Debug, Deserialize)]
struct ImageAnnotateResponse {
    #[serde(default)]
    responses: Vec<PageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_mime_is_reported() {
        let client = VisionClient::new("test-key".to_string());
        let err = client
            .extract_text(Bytes::from_static(b"data"), "text/csv")
            .await
            .unwrap_err();
        match err {
            MediaError::UnsupportedType { mime, supported } => {
                assert_eq!(mime, "text/csv");
                assert!(supported.contains("PDF"));
            }
            other => panic!("expected unsupported type, got {other:?}"),
        }
    }

    #[test]
    fn test_page_text_prefers_upstream_error() {
        let page = PageResponse {
            full_text_annotation: Some(TextAnnotation {
                text: "hello".to_string(),
            }),
            error: Some(ApiStatus {
                message: "quota exceeded".to_string(),
            }),
        };
        let err = page_text(page).unwrap_err();
        assert!(matches!(err, MediaError::Upstream { .. }));
    }

    #[test]
    fn test_page_text_missing_annotation_is_no_text_found() {
        let page = PageResponse {
            full_text_annotation: None,
            error: None,
        };
        assert_eq!(page_text(page).unwrap(), "No text found in file.");
    }

    #[test]
    fn test_docx_routes_through_document_path() {
        assert!(DOCUMENT_TYPES.contains(&DOCX_MIME));
        assert!(!IMAGE_TYPES.contains(&DOCX_MIME));
    }
}
