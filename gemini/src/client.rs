use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use atelier_common::{AspectRatio, ImageArtifact};

use crate::auth::CredentialStore;
use crate::error::{classify_failure, GeminiError};
use crate::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, InlineData, Part,
};

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Fixed output resolution class for every request.
const IMAGE_SIZE: &str = "1K";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Per-call output configuration.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    pub aspect_ratio: AspectRatio,
}

/// The seam every feature workflow calls through. `GeminiClient` is
/// the production implementation; tests substitute scripted models.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// One generation call: reference images (in caller order) plus an
    /// assembled prompt, decoded into a single image artifact.
    async fn request_image(
        &self,
        prompt: &str,
        references: &[ImageArtifact],
        options: ImageOptions,
    ) -> Result<ImageArtifact, GeminiError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    credentials: Arc<CredentialStore>,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            credentials,
        }
    }

    /// Point the client at a different endpoint root. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        prompt: &str,
        references: &[ImageArtifact],
        options: ImageOptions,
    ) -> GenerateContentRequest {
        // Reference images first, prompt text last. The prompt refers
        // to the images by position, so the order is load-bearing.
        let mut parts: Vec<Part> = references
            .iter()
            .map(|artifact| Part::InlineData {
                inline_data: InlineData {
                    mime_type: artifact.mime_type.clone(),
                    data: artifact.data.clone(),
                },
            })
            .collect();
        parts.push(Part::Text {
            text: prompt.to_string(),
        });

        GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: Some(GenerationConfig {
                image_config: ImageConfig {
                    image_size: IMAGE_SIZE.to_string(),
                    aspect_ratio: options.aspect_ratio.as_str().to_string(),
                },
            }),
        }
    }

    fn extract_image(response: GenerateContentResponse) -> Result<ImageArtifact, GeminiError> {
        if let Some(error) = response.error {
            return Err(classify_failure(None, error.message));
        }
        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(GeminiError::EmptyResponse);
        };

        let mut refusal_text: Option<String> = None;
        for part in candidate.content.parts {
            if let Some(inline) = part.inline_data {
                return Ok(ImageArtifact::new(inline.mime_type, inline.data));
            }
            if refusal_text.is_none() {
                if let Some(text) = part.text.filter(|t| !t.trim().is_empty()) {
                    refusal_text = Some(text);
                }
            }
        }
        match refusal_text {
            Some(text) => Err(GeminiError::ModelRefusal(text)),
            None => Err(GeminiError::EmptyResponse),
        }
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    async fn request_image(
        &self,
        prompt: &str,
        references: &[ImageArtifact],
        options: ImageOptions,
    ) -> Result<ImageArtifact, GeminiError> {
        // Checked before any network I/O is attempted.
        let Some(key) = self.credentials.get() else {
            return Err(GeminiError::MissingCredential);
        };

        let body = Self::build_request(prompt, references, options);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!(
            model = %self.model,
            references = references.len(),
            aspect = %options.aspect_ratio,
            "requesting image"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|err| GeminiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => envelope.error.message,
                Err(_) if text.is_empty() => format!("HTTP {status}"),
                Err(_) => text,
            };
            return Err(classify_failure(Some(status.as_u16()), message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GeminiError::Transport(err.to_string()))?;
        Self::extract_image(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(data: &str) -> ImageArtifact {
        ImageArtifact::new("image/png", data)
    }

    #[test]
    fn request_orders_references_before_prompt() {
        let request = GeminiClient::build_request(
            "a red fox",
            &[reference("QQ=="), reference("Qg==")],
            ImageOptions {
                aspect_ratio: AspectRatio::Square,
            },
        );
        let value = serde_json::to_value(&request).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["data"], "QQ==");
        assert_eq!(parts[1]["inlineData"]["data"], "Qg==");
        assert_eq!(parts[2]["text"], "a red fox");
        assert_eq!(value["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
    }

    #[test]
    fn extracts_first_inline_image() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Sure, here is your image." },
                        { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
                    ]
                }
            }]
        }))
        .unwrap();
        let artifact = GeminiClient::extract_image(response).unwrap();
        assert_eq!(artifact.mime_type, "image/png");
        assert_eq!(artifact.data, "Zmlyc3Q=");
    }

    #[test]
    fn text_only_response_is_a_refusal_with_the_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "I can't depict that person." }]
                }
            }]
        }))
        .unwrap();
        match GeminiClient::extract_image(response) {
            Err(GeminiError::ModelRefusal(text)) => {
                assert_eq!(text, "I can't depict that person.")
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidates_are_an_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            GeminiClient::extract_image(response),
            Err(GeminiError::EmptyResponse)
        ));

        let blank: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [] } }]
        }))
        .unwrap();
        assert!(matches!(
            GeminiClient::extract_image(blank),
            Err(GeminiError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn missing_credential_blocks_before_any_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CredentialStore::with_env_var(
            dir.path().join("credential"),
            "ATELIER_TEST_NO_SUCH_VAR",
        ));
        // An unroutable base URL: if the client attempted network I/O
        // this would surface as a transport error instead.
        let client =
            GeminiClient::new(DEFAULT_MODEL, store).with_base_url("http://240.0.0.0:1");
        let result = client
            .request_image(
                "anything",
                &[],
                ImageOptions {
                    aspect_ratio: AspectRatio::Wide,
                },
            )
            .await;
        assert!(matches!(result, Err(GeminiError::MissingCredential)));
    }
}
