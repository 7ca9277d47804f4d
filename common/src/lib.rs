//! Shared data model for the atelier workspace: image artifacts,
//! aspect-ratio handling, and the feature/deck types exchanged between
//! the client, core workflows, CLI, and preview crates.

pub mod artifact;
pub mod aspect;
pub mod types;

pub use artifact::ImageArtifact;
pub use aspect::{AspectRatio, AspectSelection};
