use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A generated or uploaded image held as self-describing data:
/// a MIME type plus a base64 payload. This is the unit passed between
/// the file boundary, the remote client, and every workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub mime_type: String,
    /// Raw base64 payload, without any `data:` prefix.
    pub data: String,
}

impl ImageArtifact {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes into an artifact.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URI. A bare base64 string
    /// is accepted too and assumed to be PNG, matching how previous
    /// results are fed back into refinement calls.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let Some(rest) = uri.strip_prefix("data:") else {
            if uri.contains(',') {
                bail!("not a data URI: {uri}");
            }
            return Ok(Self::new("image/png", uri));
        };
        let (header, payload) = rest
            .split_once(',')
            .context("data URI is missing the payload separator")?;
        let mime_type = header.strip_suffix(";base64").unwrap_or(header);
        if mime_type.is_empty() {
            bail!("data URI carries no MIME type");
        }
        Ok(Self::new(mime_type, payload))
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the base64 payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .context("image payload is not valid base64")
    }
}
