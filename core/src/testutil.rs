//! Scripted stand-ins for the remote model used across workflow tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atelier_common::{AspectRatio, ImageArtifact};
use atelier_gemini::{CredentialStore, GeminiError, ImageModel, ImageOptions};

use crate::StudioContext;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub references: Vec<ImageArtifact>,
    pub aspect: AspectRatio,
}

/// Returns queued responses in order and records every call. Queue
/// exhaustion fails the test loudly via a transport error.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<ImageArtifact, GeminiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<ImageArtifact, GeminiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn artifact(tag: &str) -> ImageArtifact {
        ImageArtifact::from_bytes("image/png", tag.as_bytes())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageModel for ScriptedModel {
    async fn request_image(
        &self,
        prompt: &str,
        references: &[ImageArtifact],
        options: ImageOptions,
    ) -> Result<ImageArtifact, GeminiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            references: references.to_vec(),
            aspect: options.aspect_ratio,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeminiError::Transport("scripted responses exhausted".into())))
    }
}

/// Context wired to a scripted model and a throwaway credential path.
pub fn scripted_context(model: Arc<ScriptedModel>) -> Arc<StudioContext> {
    let path = std::env::temp_dir().join(format!("atelier-test-{}", uuid::Uuid::new_v4()));
    let store = Arc::new(CredentialStore::with_env_var(path, "ATELIER_TEST_NO_SUCH_VAR"));
    StudioContext::new(model, store)
}
