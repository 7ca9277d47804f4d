use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default environment fallback honored when no credential is stored.
pub const CREDENTIAL_ENV_VAR: &str = "GEMINI_API_KEY";

/// Single-instance credential store. The credential is an opaque
/// string persisted in one well-known file under the user config
/// directory; no encryption, no expiry. It is read before every
/// remote call and cleared when the remote service signals an
/// authorization failure.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    env_var: &'static str,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_var: CREDENTIAL_ENV_VAR,
        }
    }

    /// Override the environment fallback variable. Used by tests to
    /// avoid touching the real `GEMINI_API_KEY`.
    pub fn with_env_var(path: impl Into<PathBuf>, env_var: &'static str) -> Self {
        Self {
            path: path.into(),
            env_var,
        }
    }

    /// Well-known location within the user profile.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atelier")
            .join("credential")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a credential. An empty (or whitespace-only) value clears
    /// the stored credential instead.
    pub fn set(&self, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, value)
            .with_context(|| format!("writing credential to {}", self.path.display()))
    }

    /// The stored credential, else the environment fallback, else none.
    pub fn get(&self) -> Option<String> {
        if let Ok(contents) = fs::read_to_string(&self.path) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        std::env::var(self.env_var).ok().filter(|v| !v.is_empty())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("removing {}", self.path.display()))
            }
        }
    }

    /// Credential-invalidation side effect for authorization failures.
    /// Best-effort: a failure to remove the file is logged, not
    /// propagated, since the caller is already handling a remote error.
    pub fn invalidate(&self) {
        if let Err(err) = self.clear() {
            tracing::warn!("failed to clear stored credential: {err:#}");
        } else {
            tracing::info!("stored credential cleared after authorization failure");
        }
    }
}
