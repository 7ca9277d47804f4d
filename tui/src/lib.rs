//! Terminal preview for exported decks.

pub mod preview;

pub use preview::run_preview;
