use atelier_gemini::{CredentialStore, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub model: String,
    pub credential_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            credential_path: CredentialStore::default_path(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("ATELIER_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }

        if let Ok(path) = std::env::var("ATELIER_CREDENTIAL_FILE") {
            if !path.is_empty() {
                config.credential_path = PathBuf::from(path);
            }
        }

        if let Ok(dir) = std::env::var("ATELIER_OUTPUT_DIR") {
            if !dir.is_empty() {
                config.output_dir = PathBuf::from(dir);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_preview_image_model() {
        let config = Config::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }
}
