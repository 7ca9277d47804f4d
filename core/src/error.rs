use atelier_gemini::GeminiError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Remote(#[from] GeminiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not an image file: {0}")]
    UnsupportedMedia(String),

    #[error("failed to decode image data: {0}")]
    InvalidImage(String),

    #[error("nothing to refine yet; generate an image first")]
    NothingToRefine,

    #[error("a theme prompt is required")]
    EmptyTheme,

    #[error("unknown template: {0}")]
    UnknownTemplate(Uuid),

    #[error("unknown page: {0}")]
    UnknownPage(Uuid),

    #[error("at least one page needs prompt text")]
    NoPromptedPages,

    #[error("a deck must keep at least one page")]
    LastPage,

    #[error("that page has no generated image yet")]
    PageNotGenerated,

    #[error("operation is not valid in the {0} phase")]
    WrongPhase(&'static str),

    #[error("all {0} template generations failed; last error: {1}")]
    TemplatesFailed(usize, String),
}
