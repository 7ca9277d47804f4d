use thiserror::Error;

/// Failure taxonomy for remote image calls, by condition rather than
/// by transport detail. Raw messages are carried through unmodified so
/// callers can show them verbatim.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no API credential is configured")]
    MissingCredential,

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("the model declined to produce an image: {0}")]
    ModelRefusal(String),

    #[error("the response contained neither an image nor text")]
    EmptyResponse,

    #[error("{0}")]
    Transport(String),
}

impl GeminiError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, GeminiError::Authorization(_))
    }
}

/// Classify a failed remote call. The HTTP status is authoritative
/// when present; substring matching on the free-text message is a
/// fallback only, since those strings are not a stable upstream
/// contract.
pub fn classify_failure(status: Option<u16>, message: String) -> GeminiError {
    match status {
        Some(429) => GeminiError::RateLimited(message),
        Some(401) | Some(403) | Some(404) => GeminiError::Authorization(message),
        _ => {
            let lower = message.to_lowercase();
            if lower.contains("429") || lower.contains("quota") || lower.contains("rate limit") {
                GeminiError::RateLimited(message)
            } else if lower.contains("403")
                || lower.contains("permission denied")
                || lower.contains("api key not valid")
            {
                GeminiError::Authorization(message)
            } else {
                GeminiError::Transport(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_win_over_message_text() {
        assert!(matches!(
            classify_failure(Some(429), "anything".into()),
            GeminiError::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure(Some(403), "anything".into()),
            GeminiError::Authorization(_)
        ));
        assert!(matches!(
            classify_failure(Some(404), "model not found".into()),
            GeminiError::Authorization(_)
        ));
        assert!(matches!(
            classify_failure(Some(500), "internal".into()),
            GeminiError::Transport(_)
        ));
    }

    #[test]
    fn substring_fallback_without_status() {
        assert!(matches!(
            classify_failure(None, "Resource exhausted: quota exceeded".into()),
            GeminiError::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure(None, "Permission denied for project".into()),
            GeminiError::Authorization(_)
        ));
        let err = classify_failure(None, "connection reset by peer".into());
        assert!(matches!(err, GeminiError::Transport(_)));
        assert_eq!(err.to_string(), "connection reset by peer");
    }
}
