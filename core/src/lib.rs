//! Core studio logic: feature workflows, the slide-deck state machine,
//! prompt assembly, and the file input/output boundary. Everything
//! remote goes through the `ImageModel` seam from `atelier-gemini`.

pub mod config;
pub mod deck;
pub mod error;
pub mod features;
pub mod media;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use atelier_gemini::{CredentialStore, GeminiError, ImageModel};

pub use config::Config;
pub use error::StudioError;

/// Shared handles every workflow operates through: the remote model
/// and the credential store. Replaces the original's browser-global
/// state with an explicitly scoped context.
pub struct StudioContext {
    pub model: Arc<dyn ImageModel>,
    pub credentials: Arc<CredentialStore>,
}

impl StudioContext {
    pub fn new(model: Arc<dyn ImageModel>, credentials: Arc<CredentialStore>) -> Arc<Self> {
        Arc::new(Self { model, credentials })
    }

    /// Bookkeeping for a failed remote call. An authorization failure
    /// invalidates the stored credential so the surface prompts for a
    /// new one; every other failure is left to the caller to display.
    pub(crate) fn note_remote_failure(&self, err: &GeminiError) {
        if err.is_authorization() {
            self.credentials.invalidate();
        }
    }
}
