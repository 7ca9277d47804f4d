//! Gemini integration: the single outbound integration point of the
//! studio. Holds the credential store, the `generateContent` wire
//! types, and the image client with its failure taxonomy.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::CredentialStore;
pub use client::{GeminiClient, ImageModel, ImageOptions, DEFAULT_MODEL};
pub use error::GeminiError;
